//! Entity metadata consumed by the path resolver.
//!
//! The resolver only talks to [`MetadataCatalog`]; [`StaticCatalog`] is an
//! in-memory implementation fed from configuration or built in code.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{QueryError, Result};

/// Kind of relationship between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    ManyToOne,
    OneToMany,
    ManyToMany,
    OneToOne,
}

impl AssociationKind {
    pub fn is_to_many(self) -> bool {
        matches!(self, AssociationKind::OneToMany | AssociationKind::ManyToMany)
    }
}

/// Metadata of one association, as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationInfo {
    /// Canonical property name of the association.
    pub property_name: String,
    pub target_entity: String,
    pub kind: AssociationKind,
}

/// Answers field and association questions about entities.
///
/// Implementations own any caching; every method takes `&self` so resolution
/// calls can interleave freely. Unknown entities are reported as
/// [`QueryError::InvalidEntity`].
pub trait MetadataCatalog {
    fn has_field(&self, entity: &str, name: &str) -> Result<bool>;

    fn get_available_fields(&self, entity: &str) -> Result<Vec<String>>;

    fn is_association(&self, entity: &str, name: &str) -> Result<bool>;

    fn get_association_info(&self, entity: &str, name: &str) -> Result<AssociationInfo>;

    fn get_available_associations(&self, entity: &str) -> Result<Vec<String>>;
}

macro_rules! forward_catalog {
    ($($ty:ty),*) => {$(
        impl<T: MetadataCatalog + ?Sized> MetadataCatalog for $ty {
            fn has_field(&self, entity: &str, name: &str) -> Result<bool> {
                (**self).has_field(entity, name)
            }

            fn get_available_fields(&self, entity: &str) -> Result<Vec<String>> {
                (**self).get_available_fields(entity)
            }

            fn is_association(&self, entity: &str, name: &str) -> Result<bool> {
                (**self).is_association(entity, name)
            }

            fn get_association_info(&self, entity: &str, name: &str) -> Result<AssociationInfo> {
                (**self).get_association_info(entity, name)
            }

            fn get_available_associations(&self, entity: &str) -> Result<Vec<String>> {
                (**self).get_available_associations(entity)
            }
        }
    )*};
}

forward_catalog!(&T, Box<T>, Arc<T>);

/// Unqualified form of an entity identifier, used in messages.
///
/// `app::entity::Product`, `App\Entity\Product` and `app/entity/Product`
/// all shorten to `Product`.
pub fn short_name(entity: &str) -> &str {
    let cut = ["::", "\\", "/"]
        .iter()
        .filter_map(|sep| entity.rfind(sep).map(|i| i + sep.len()))
        .max()
        .unwrap_or(0);
    &entity[cut..]
}

/// Association declared on an [`EntityDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDefinition {
    pub name: String,
    pub target: String,
    pub kind: AssociationKind,
}

/// Fields and associations of one entity, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDefinition {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub associations: Vec<AssociationDefinition>,
}

impl EntityDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str) -> Self {
        self.fields.push(name.to_string());
        self
    }

    pub fn association(mut self, name: &str, target: &str, kind: AssociationKind) -> Self {
        self.associations.push(AssociationDefinition {
            name: name.to_string(),
            target: target.to_string(),
            kind,
        });
        self
    }

    fn find_association(&self, name: &str) -> Option<&AssociationDefinition> {
        self.associations.iter().find(|a| a.name == name)
    }
}

/// In-memory catalog keyed by entity identifier.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entities: HashMap<String, EntityDefinition>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(entities: HashMap<String, EntityDefinition>) -> Self {
        Self { entities }
    }

    pub fn insert(&mut self, entity: &str, definition: EntityDefinition) {
        self.entities.insert(entity.to_string(), definition);
    }

    /// Builder form of [`StaticCatalog::insert`].
    pub fn with_entity(mut self, entity: &str, definition: EntityDefinition) -> Self {
        self.insert(entity, definition);
        self
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    fn definition(&self, entity: &str) -> Result<&EntityDefinition> {
        self.entities
            .get(entity)
            .ok_or_else(|| QueryError::invalid_entity(entity))
    }
}

impl MetadataCatalog for StaticCatalog {
    fn has_field(&self, entity: &str, name: &str) -> Result<bool> {
        Ok(self.definition(entity)?.fields.iter().any(|f| f == name))
    }

    fn get_available_fields(&self, entity: &str) -> Result<Vec<String>> {
        Ok(self.definition(entity)?.fields.clone())
    }

    fn is_association(&self, entity: &str, name: &str) -> Result<bool> {
        Ok(self.definition(entity)?.find_association(name).is_some())
    }

    fn get_association_info(&self, entity: &str, name: &str) -> Result<AssociationInfo> {
        let definition = self.definition(entity)?;
        let association = definition.find_association(name).ok_or_else(|| {
            let available: Vec<String> =
                definition.associations.iter().map(|a| a.name.clone()).collect();
            QueryError::InvalidProperty {
                entity: short_name(entity).to_string(),
                segment: name.to_string(),
                path: name.to_string(),
                message: format!(
                    "Association '{name}' does not exist on entity '{}'",
                    short_name(entity)
                ),
                available,
            }
        })?;
        Ok(AssociationInfo {
            property_name: association.name.clone(),
            target_entity: association.target.clone(),
            kind: association.kind,
        })
    }

    fn get_available_associations(&self, entity: &str) -> Result<Vec<String>> {
        Ok(self
            .definition(entity)?
            .associations
            .iter()
            .map(|a| a.name.clone())
            .collect())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("app::entity::Product"), "Product");
        assert_eq!(short_name("App\\Entity\\Product"), "Product");
        assert_eq!(short_name("app/entity/Product"), "Product");
        assert_eq!(short_name("Product"), "Product");
    }

    #[test]
    fn test_static_catalog_answers() {
        let catalog = catalog();
        assert!(catalog.has_field(PRODUCT, "price").unwrap());
        assert!(!catalog.has_field(PRODUCT, "manufacturer").unwrap());
        assert!(catalog.is_association(PRODUCT, "manufacturer").unwrap());
        assert_eq!(
            catalog.get_available_associations(PRODUCT).unwrap(),
            vec!["manufacturer", "reviews"]
        );
        let info = catalog.get_association_info(MANUFACTURER, "country").unwrap();
        assert_eq!(info.target_entity, COUNTRY);
        assert_eq!(info.kind, AssociationKind::ManyToOne);
    }

    #[test]
    fn test_unknown_entity() {
        let err = catalog().get_available_fields("app::entity::Ghost").unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidEntity {
                entity: "app::entity::Ghost".to_string()
            }
        );
    }

    #[test]
    fn test_forwarding_through_arc() {
        let catalog: Arc<dyn MetadataCatalog> = Arc::new(catalog());
        assert!(catalog.has_field(COUNTRY, "code").unwrap());
    }

    #[test]
    fn test_definition_from_json() {
        let definition: EntityDefinition = serde_json::from_str(
            r#"{"fields": ["id"], "associations": [{"name": "tags", "target": "Tag", "kind": "many_to_many"}]}"#,
        )
        .unwrap();
        assert_eq!(definition.associations[0].kind, AssociationKind::ManyToMany);
        assert!(definition.associations[0].kind.is_to_many());
    }
}
