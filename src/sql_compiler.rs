//! SQL compiler that turns parsed filter conditions into SQL text using sea-query.
//!
//! Every field reference is first passed through the [`AliasRegistry`] and then
//! validated by the [`PathResolver`]; nothing reaches sea-query unvalidated.

use sea_query::{
    Alias, Asterisk, Condition as SqlCondition, Expr, JoinType, PostgresQueryBuilder, Query,
    SelectStatement, SimpleExpr, Value as SqlValue,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::alias::{AliasRegistry, ReferenceKind};
use crate::ast::{CompoundResult, Condition, LogicalOperator, Operator};
use crate::catalog::{short_name, AssociationKind, MetadataCatalog};
use crate::config::CatalogConfig;
use crate::error::{QueryError, Result};
use crate::resolver::PathResolver;
use crate::value::Value;

/// A condition field after alias substitution and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCondition {
    pub original: String,
    pub path: String,
    pub kind: ReferenceKind,
}

/// Result of compiling a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledFilter {
    pub sql: String,
    pub resolved: Vec<ResolvedCondition>,
}

/// Compiles parsed filters against one catalog and alias registry.
pub struct FilterCompiler<'a, C: ?Sized> {
    resolver: PathResolver<'a, C>,
    aliases: &'a AliasRegistry,
    /// Maps entity names to table names
    table_mapping: HashMap<String, String>,
}

impl<'a, C: MetadataCatalog + ?Sized> FilterCompiler<'a, C> {
    pub fn new(catalog: &'a C, aliases: &'a AliasRegistry) -> Self {
        Self {
            resolver: PathResolver::new(catalog),
            aliases,
            table_mapping: HashMap::new(),
        }
    }

    pub fn from_config(catalog: &'a C, aliases: &'a AliasRegistry, config: &CatalogConfig) -> Self {
        Self {
            resolver: PathResolver::with_format(catalog, config.format.clone()),
            aliases,
            table_mapping: config.table_mapping.clone(),
        }
    }

    /// Set table mapping for entity names
    pub fn set_table_mapping(&mut self, mapping: HashMap<String, String>) {
        self.table_mapping = mapping;
    }

    /// Get the actual table name for an entity
    fn get_table_name(&self, entity: &str) -> String {
        self.table_mapping
            .get(entity)
            .cloned()
            .unwrap_or_else(|| short_name(entity).to_lowercase())
    }

    /// Compile a parsed filter rooted at `root_entity` into a SELECT statement.
    pub fn compile(&self, root_entity: &str, filter: &CompoundResult) -> Result<CompiledFilter> {
        let table = self.get_table_name(root_entity);
        let root = self
            .aliases
            .main_alias()
            .map_or_else(|| table.clone(), str::to_string);

        let mut select = Query::select();
        select.column(Asterisk);
        if root == table {
            select.from(Alias::new(&table));
        } else {
            select.from_as(Alias::new(&table), Alias::new(&root));
        }

        let mut joined = Vec::new();
        let mut resolved = Vec::with_capacity(filter.conditions.len());
        let mut condition = match filter.logical_operator {
            Some(LogicalOperator::Or) => SqlCondition::any(),
            Some(LogicalOperator::And) | None => SqlCondition::all(),
        };

        for parsed in &filter.conditions {
            let reference = self.aliases.resolve(&parsed.field);
            let path = self.resolver.resolve_property(root_entity, &reference.path)?;

            let (table_alias, column) = match path.rsplit_once('.') {
                None => (root.clone(), path.clone()),
                Some((prefix, column)) => {
                    self.join_path(&mut select, &mut joined, root_entity, &root, prefix)?;
                    (join_alias(prefix), column.to_string())
                }
            };

            let column = Expr::col((Alias::new(table_alias), Alias::new(column)));
            condition = condition.add(compile_condition(column, parsed));
            resolved.push(ResolvedCondition {
                original: parsed.field.clone(),
                path,
                kind: reference.kind,
            });
        }

        select.cond_where(condition);
        let sql = select.to_string(PostgresQueryBuilder);
        debug!(root_entity = short_name(root_entity), %sql, "compiled filter");

        Ok(CompiledFilter { sql, resolved })
    }

    /// Adds one LEFT JOIN per association hop of `prefix` not joined yet.
    ///
    /// To-one hops join on `<parent>.<property>_id`, one-to-many hops on
    /// `<alias>.<parent>_id`. Many-to-many hops need a join table the catalog
    /// does not describe and fail with [`QueryError::UnsupportedJoin`].
    fn join_path(
        &self,
        select: &mut SelectStatement,
        joined: &mut Vec<String>,
        root_entity: &str,
        root: &str,
        prefix: &str,
    ) -> Result<()> {
        let chain = self.resolver.association_chain(root_entity, prefix)?;

        let mut parent_entity = root_entity.to_string();
        let mut parent_alias = root.to_string();
        let mut hop_path = String::new();

        for info in chain {
            if !hop_path.is_empty() {
                hop_path.push('.');
            }
            hop_path.push_str(&info.property_name);
            let alias = join_alias(&hop_path);

            if !joined.contains(&hop_path) {
                if info.kind == AssociationKind::ManyToMany {
                    return Err(QueryError::UnsupportedJoin {
                        entity: short_name(&parent_entity).to_string(),
                        association: info.property_name,
                    });
                }
                let on = if info.kind == AssociationKind::OneToMany {
                    let foreign_key = format!("{}_id", short_name(&parent_entity).to_lowercase());
                    Expr::col((Alias::new(&alias), Alias::new(foreign_key)))
                        .equals((Alias::new(&parent_alias), Alias::new("id")))
                } else {
                    let foreign_key = format!("{}_id", info.property_name);
                    Expr::col((Alias::new(&alias), Alias::new("id")))
                        .equals((Alias::new(&parent_alias), Alias::new(foreign_key)))
                };
                select.join_as(
                    JoinType::LeftJoin,
                    Alias::new(self.get_table_name(&info.target_entity)),
                    Alias::new(&alias),
                    on,
                );
                joined.push(hop_path.clone());
            }

            parent_entity = info.target_entity;
            parent_alias = alias;
        }
        Ok(())
    }
}

/// Join alias of an association prefix: `manufacturer.country` → `manufacturer_country`.
fn join_alias(prefix: &str) -> String {
    prefix.replace('.', "_")
}

/// Compile a single condition
fn compile_condition(column: Expr, condition: &Condition) -> SimpleExpr {
    let value = &condition.value;
    match condition.operator {
        Operator::Eq if value.is_null() => column.is_null(),
        Operator::Neq if value.is_null() => column.is_not_null(),
        Operator::Eq => column.eq(to_sql_value(value)),
        Operator::Neq => column.ne(to_sql_value(value)),
        Operator::Gt => column.gt(to_sql_value(value)),
        Operator::Gte => column.gte(to_sql_value(value)),
        Operator::Lt => column.lt(to_sql_value(value)),
        Operator::Lte => column.lte(to_sql_value(value)),
        Operator::Like => column.like(like_pattern(value)),
        Operator::In => column.is_in(to_sql_list(value)),
        Operator::NotIn => column.is_not_in(to_sql_list(value)),
        Operator::IsNull => column.is_null(),
        Operator::IsNotNull => column.is_not_null(),
    }
}

/// Convert a parsed value to a sea-query value; lists outside IN render as text
fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::String(None),
        Value::Bool(b) => SqlValue::Bool(Some(*b)),
        Value::Int(i) => SqlValue::BigInt(Some(*i)),
        Value::Float(x) => SqlValue::Double(Some(*x)),
        Value::Text(s) => SqlValue::String(Some(Box::new(s.clone()))),
        Value::List(_) => SqlValue::String(Some(Box::new(value.to_string()))),
    }
}

fn to_sql_list(value: &Value) -> Vec<SqlValue> {
    match value {
        Value::List(items) => items.iter().map(to_sql_value).collect(),
        scalar => vec![to_sql_value(scalar)],
    }
}

fn like_pattern(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        other => other.to_string(),
    }
}
