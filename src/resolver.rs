//! Validation of dotted property and association paths against a
//! [`MetadataCatalog`].
//!
//! Both operations walk the path one segment at a time, carrying the
//! "current" entity forward through every association hop.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{short_name, AssociationInfo, MetadataCatalog};
use crate::error::{QueryError, Result};

/// How lists of valid alternatives are rendered in error messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatPolicy {
    /// Number of names listed before truncating. `None` lists everything.
    pub max_listed: Option<usize>,
    /// Appended after a truncated list.
    pub ellipsis: String,
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Self {
            max_listed: Some(10),
            ellipsis: "...".to_string(),
        }
    }
}

impl FormatPolicy {
    pub fn unlimited() -> Self {
        Self {
            max_listed: None,
            ..Self::default()
        }
    }

    /// Joins `names` with `", "`, truncated to `max_listed`.
    pub fn list(&self, names: &[String]) -> String {
        match self.max_listed {
            Some(0) if !names.is_empty() => self.ellipsis.clone(),
            Some(max) if names.len() > max => {
                let mut listed = names[..max].join(", ");
                listed.push_str(", ");
                listed.push_str(&self.ellipsis);
                listed
            }
            _ => names.join(", "),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Alternatives {
    Fields,
    Associations,
}

impl Alternatives {
    fn label(self) -> &'static str {
        match self {
            Alternatives::Fields => "fields",
            Alternatives::Associations => "associations",
        }
    }
}

/// A validated association chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAssociationPath {
    /// Canonical property names joined by `.`.
    pub path: String,
    pub terminal_entity: String,
    pub terminal_property: String,
}

/// Stateless resolver borrowing an externally owned catalog.
#[derive(Debug, Clone)]
pub struct PathResolver<'a, C: ?Sized> {
    catalog: &'a C,
    format: FormatPolicy,
}

impl<'a, C: MetadataCatalog + ?Sized> PathResolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self::with_format(catalog, FormatPolicy::default())
    }

    pub fn with_format(catalog: &'a C, format: FormatPolicy) -> Self {
        Self { catalog, format }
    }

    /// Validates `property` on `entity` and returns its canonical dotted path.
    ///
    /// Every segment but the last must be an association of the current
    /// entity; the last must be a field of the entity the chain ends on.
    pub fn resolve_property(&self, entity: &str, property: &str) -> Result<String> {
        let Some((associations, field)) = property.rsplit_once('.') else {
            if self.catalog.has_field(entity, property)? {
                return Ok(property.to_string());
            }
            let available = self.catalog.get_available_fields(entity)?;
            return Err(self.property_error(
                entity,
                property,
                property,
                Alternatives::Fields,
                available,
                format!(
                    "Property '{property}' does not exist on entity '{}'.",
                    short_name(entity)
                ),
            ));
        };

        let mut current = entity.to_string();
        let mut canonical = Vec::new();
        for segment in associations.split('.') {
            let info = self.hop(&current, segment, property)?;
            canonical.push(info.property_name);
            current = info.target_entity;
        }

        if !self.catalog.has_field(&current, field)? {
            let available = self.catalog.get_available_fields(&current)?;
            return Err(self.property_error(
                &current,
                field,
                property,
                Alternatives::Fields,
                available,
                format!(
                    "Field '{field}' does not exist on entity '{}' in path '{property}'.",
                    short_name(&current)
                ),
            ));
        }
        canonical.push(field.to_string());

        let resolved = canonical.join(".");
        debug!(entity = short_name(entity), property, %resolved, "resolved property path");
        Ok(resolved)
    }

    /// Validates an association chain where every segment, the last included,
    /// is an association.
    pub fn resolve_association(
        &self,
        entity: &str,
        association: &str,
    ) -> Result<ResolvedAssociationPath> {
        let mut current = entity.to_string();
        let mut canonical = Vec::new();
        let mut terminal_property = String::new();

        for segment in association.split('.') {
            let info = self.hop(&current, segment, association)?;
            terminal_property.clone_from(&info.property_name);
            canonical.push(info.property_name);
            current = info.target_entity;
        }

        let resolved = ResolvedAssociationPath {
            path: canonical.join("."),
            terminal_entity: current,
            terminal_property,
        };
        debug!(
            entity = short_name(entity),
            association,
            path = %resolved.path,
            terminal = short_name(&resolved.terminal_entity),
            "resolved association path"
        );
        Ok(resolved)
    }

    /// Metadata of every hop along an association chain, in order.
    pub fn association_chain(&self, entity: &str, association: &str) -> Result<Vec<AssociationInfo>> {
        let mut current = entity.to_string();
        let mut chain = Vec::new();
        for segment in association.split('.') {
            let info = self.hop(&current, segment, association)?;
            current.clone_from(&info.target_entity);
            chain.push(info);
        }
        Ok(chain)
    }

    fn hop(&self, entity: &str, segment: &str, path: &str) -> Result<AssociationInfo> {
        if self.catalog.is_association(entity, segment)? {
            return self.catalog.get_association_info(entity, segment);
        }
        let available = self.catalog.get_available_associations(entity)?;
        let message = if segment == path {
            format!(
                "Association '{segment}' does not exist on entity '{}'.",
                short_name(entity)
            )
        } else {
            format!(
                "Association '{segment}' does not exist on entity '{}' in path '{path}'.",
                short_name(entity)
            )
        };
        Err(self.property_error(
            entity,
            segment,
            path,
            Alternatives::Associations,
            available,
            message,
        ))
    }

    fn property_error(
        &self,
        entity: &str,
        segment: &str,
        path: &str,
        alternatives: Alternatives,
        available: Vec<String>,
        message: String,
    ) -> QueryError {
        let listed = if available.is_empty() {
            "none".to_string()
        } else {
            self.format.list(&available)
        };
        QueryError::InvalidProperty {
            entity: short_name(entity).to_string(),
            segment: segment.to_string(),
            path: path.to_string(),
            message: format!("{message} Available {}: {listed}", alternatives.label()),
            available,
        }
    }
}
