//! Error types shared by the parser, the alias registry and the path resolver.

use thiserror::Error;

/// Errors produced while turning filter strings and dotted references into
/// validated structures. All of them describe caller-input defects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No recognised operator was found in a simple sub-expression.
    #[error("Invalid expression '{expression}': no supported operator found")]
    InvalidOperator { expression: String },

    /// Malformed alias, or an alias that conflicts with an existing one.
    #[error("{message}")]
    InvalidAlias { alias: String, message: String },

    /// A field or association segment does not exist on the entity it was
    /// checked against.
    #[error("{message}")]
    InvalidProperty {
        /// Short entity name the failing segment was checked against.
        entity: String,
        segment: String,
        /// Full reference as supplied by the caller.
        path: String,
        /// Valid alternatives at the failing level.
        available: Vec<String>,
        message: String,
    },

    /// A many-to-many hop has no join table to go through, so it cannot be
    /// rendered as a single SQL join.
    #[error(
        "Association '{association}' on entity '{entity}' is many-to-many and cannot be joined"
    )]
    UnsupportedJoin { entity: String, association: String },

    /// The metadata catalog does not know the entity at all.
    #[error("Unknown entity '{entity}'")]
    InvalidEntity { entity: String },
}

/// The parse surface reports its failures with the same enum.
pub type ParseError = QueryError;

pub type Result<T> = std::result::Result<T, QueryError>;

impl QueryError {
    pub(crate) fn invalid_operator(expression: impl Into<String>) -> Self {
        Self::InvalidOperator {
            expression: expression.into(),
        }
    }

    pub(crate) fn invalid_alias(alias: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAlias {
            alias: alias.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_entity(entity: impl Into<String>) -> Self {
        Self::InvalidEntity {
            entity: entity.into(),
        }
    }
}
