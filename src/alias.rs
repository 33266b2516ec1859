//! 别名注册表: 短别名到关联路径前缀的映射, 以及一个主实体别名

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, trace};

use crate::error::{QueryError, Result};

static ALIAS_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("alias pattern is valid"));

/// 触发了哪条解析规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// 不含点号的字段
    Direct,
    /// 前缀是已注册的别名
    Alias,
    /// 前缀是主实体别名
    MainAlias,
    /// 其他带点号的路径, 原样保留
    Nested,
}

/// 别名替换后的引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedReference {
    pub path: String,
    pub kind: ReferenceKind,
    pub original: String,
}

/// 一次查询构建过程中的别名状态
///
/// 复制 (`Clone`, `copy_to`, `snapshot`) 得到的是独立的值, 修改任意一方都不会影响另一方。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasRegistry {
    aliases: HashMap<String, String>,
    main_alias: Option<String>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册别名
    ///
    /// 别名必须匹配 `[A-Za-z_][A-Za-z0-9_]*`, 且不能与已注册的别名或主实体别名重复。
    pub fn register(&mut self, alias: &str, association_path: &str) -> Result<()> {
        if !ALIAS_SYNTAX.is_match(alias) {
            return Err(QueryError::invalid_alias(
                alias,
                format!(
                    "Invalid alias '{alias}': aliases must start with a letter or underscore \
                     and contain only letters, digits and underscores"
                ),
            ));
        }
        if let Some(existing) = self.aliases.get(alias) {
            return Err(QueryError::invalid_alias(
                alias,
                format!("Alias '{alias}' is already registered for '{existing}'"),
            ));
        }
        if self.main_alias.as_deref() == Some(alias) {
            return Err(QueryError::invalid_alias(
                alias,
                format!("Alias '{alias}' is already used as the main entity alias"),
            ));
        }

        debug!(alias, association_path, "registered alias");
        self.aliases
            .insert(alias.to_string(), association_path.to_string());
        Ok(())
    }

    /// 设置主实体别名, 重复设置时以最后一次为准
    pub fn set_main_alias(&mut self, alias: &str) -> Result<()> {
        if let Some(existing) = self.aliases.get(alias) {
            return Err(QueryError::invalid_alias(
                alias,
                format!(
                    "Main alias '{alias}' conflicts with the alias registered for '{existing}'"
                ),
            ));
        }
        debug!(alias, "set main alias");
        self.main_alias = Some(alias.to_string());
        Ok(())
    }

    /// 将字段引用中的别名替换为对应的关联路径, 不会失败
    pub fn resolve(&self, field: &str) -> ResolvedReference {
        let (path, kind) = match field.split_once('.') {
            None => (field.to_string(), ReferenceKind::Direct),
            Some((head, rest)) => {
                if let Some(target) = self.aliases.get(head) {
                    (format!("{target}.{rest}"), ReferenceKind::Alias)
                } else if self.main_alias.as_deref() == Some(head) {
                    (rest.to_string(), ReferenceKind::MainAlias)
                } else {
                    (field.to_string(), ReferenceKind::Nested)
                }
            }
        };

        trace!(field, %path, ?kind, "resolved reference");
        ResolvedReference {
            path,
            kind,
            original: field.to_string(),
        }
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    /// 别名对应的关联路径
    pub fn target(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn main_alias(&self) -> Option<&str> {
        self.main_alias.as_deref()
    }

    /// 所有已注册的别名, 顺序不固定
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn clear(&mut self) {
        self.aliases.clear();
        self.main_alias = None;
    }

    /// 将别名映射和主实体别名复制到 `target`, 覆盖其原有状态
    pub fn copy_to(&self, target: &mut AliasRegistry) {
        target.clone_from(self);
    }

    /// 为子查询创建独立副本
    pub fn snapshot(&self) -> AliasRegistry {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AliasRegistry {
        let mut registry = AliasRegistry::new();
        registry.register("m", "manufacturer").unwrap();
        registry.register("c", "manufacturer.country").unwrap();
        registry.set_main_alias("p").unwrap();
        registry
    }

    #[test]
    fn test_resolve_alias() {
        let resolved = registry().resolve("m.name");
        assert_eq!(resolved.path, "manufacturer.name");
        assert_eq!(resolved.kind, ReferenceKind::Alias);
        assert_eq!(resolved.original, "m.name");

        let resolved = registry().resolve("c.code");
        assert_eq!(resolved.path, "manufacturer.country.code");
    }

    #[test]
    fn test_resolve_direct() {
        let resolved = registry().resolve("price");
        assert_eq!(resolved.path, "price");
        assert_eq!(resolved.kind, ReferenceKind::Direct);
    }

    #[test]
    fn test_resolve_main_alias() {
        let resolved = registry().resolve("p.price");
        assert_eq!(resolved.path, "price");
        assert_eq!(resolved.kind, ReferenceKind::MainAlias);
    }

    #[test]
    fn test_resolve_nested_unchanged() {
        let resolved = registry().resolve("manufacturer.country.name");
        assert_eq!(resolved.path, "manufacturer.country.name");
        assert_eq!(resolved.kind, ReferenceKind::Nested);
    }

    #[test]
    fn test_only_first_segment_is_substituted() {
        let resolved = registry().resolve("m.m.name");
        assert_eq!(resolved.path, "manufacturer.m.name");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let registry = registry();
        assert_eq!(registry.resolve("m.name"), registry.resolve("m.name"));
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let mut registry = registry();
        let err = registry.register("m", "other").unwrap_err();
        assert!(matches!(err, QueryError::InvalidAlias { ref alias, .. } if alias == "m"));
        assert_eq!(registry.target("m"), Some("manufacturer"));
    }

    #[test]
    fn test_malformed_alias_rejected() {
        let mut registry = AliasRegistry::new();
        for alias in ["", "1m", "m-1", "m.n", "m n"] {
            assert!(
                matches!(registry.register(alias, "x"), Err(QueryError::InvalidAlias { .. })),
                "{alias:?}"
            );
        }
        assert!(registry.register("_m1", "x").is_ok());
        assert!(registry.register("Maker", "x").is_ok());
    }

    #[test]
    fn test_main_alias_conflicts() {
        let mut registry = registry();
        assert!(matches!(
            registry.set_main_alias("m"),
            Err(QueryError::InvalidAlias { .. })
        ));
        assert!(matches!(
            registry.register("p", "parent"),
            Err(QueryError::InvalidAlias { .. })
        ));
        // redefinition of the main alias itself is allowed
        registry.set_main_alias("q").unwrap();
        assert_eq!(registry.main_alias(), Some("q"));
    }

    #[test]
    fn test_clear() {
        let mut registry = registry();
        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.has_alias("m"));
        assert_eq!(registry.main_alias(), None);
        assert_eq!(registry.resolve("p.price").kind, ReferenceKind::Nested);
    }

    #[test]
    fn test_copy_to_is_a_snapshot() {
        let mut source = registry();
        let mut target = AliasRegistry::new();
        target.register("old", "stale").unwrap();

        source.copy_to(&mut target);
        assert!(!target.has_alias("old"));
        assert_eq!(target.main_alias(), Some("p"));
        assert_eq!(target.len(), 2);

        source.register("x", "extra").unwrap();
        source.set_main_alias("root").unwrap();
        assert!(!target.has_alias("x"));
        assert_eq!(target.main_alias(), Some("p"));

        target.register("y", "other").unwrap();
        assert!(!source.has_alias("y"));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let source = registry();
        let mut derived = source.snapshot();
        derived.clear();
        assert!(source.has_alias("m"));
        assert_eq!(source.main_alias(), Some("p"));
    }
}
