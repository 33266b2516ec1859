//! 配置模块，负责加载JSON配置文件

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::{EntityDefinition, StaticCatalog};
use crate::resolver::FormatPolicy;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置文件不存在: {}", .0.display())]
    Missing(PathBuf),
    #[error("无法读取配置文件 {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("无法解析JSON配置文件 {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 目录配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// 错误信息中候选名称的显示方式
    #[serde(default)]
    pub format: FormatPolicy,
    /// 实体名到数据库表名的映射
    #[serde(default)]
    pub table_mapping: HashMap<String, String>,
    /// 实体定义
    #[serde(default)]
    pub entities: HashMap<String, EntityDefinition>,
}

impl CatalogConfig {
    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        // 检查文件是否存在
        if !path_ref.exists() {
            return Err(ConfigError::Missing(path_ref.to_path_buf()));
        }

        // 读取文件内容
        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;

        // 解析JSON
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path_ref.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path_ref.display(), "loaded catalog configuration");
        Ok(config)
    }

    /// 由实体定义构建内存目录
    pub fn catalog(&self) -> StaticCatalog {
        StaticCatalog::from_definitions(self.entities.clone())
    }
}
