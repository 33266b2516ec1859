//! Filter expressions and entity paths written as strings, parsed and
//! validated into structures a query layer can consume.
//!
//! ```text
//! "stock > 10 AND m.name LIKE 'A%'"
//!     └─ parser::parse ──────────→ CompoundResult { conditions: [...] }
//!                                        │ condition.field
//!        AliasRegistry::resolve ←────────┘
//!            └─ PathResolver::resolve_property ─→ "manufacturer.name"
//! ```

pub mod alias;
pub mod ast;
pub mod catalog;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod sql_compiler;
pub mod token;
pub mod value;

pub use alias::{AliasRegistry, ReferenceKind, ResolvedReference};
pub use ast::{CompoundResult, Condition, LogicalOperator, Operator};
pub use catalog::{AssociationInfo, AssociationKind, MetadataCatalog, StaticCatalog};
pub use error::{ParseError, QueryError, Result};
pub use parser::{parse, Parser};
pub use resolver::{FormatPolicy, PathResolver, ResolvedAssociationPath};
pub use value::Value;
