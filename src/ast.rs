//! 过滤表达式的解析结果

use serde::Serialize;
use std::fmt;

use crate::value::Value;

/// 解析的根节点, 代表一个完整的过滤表达式
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundResult {
    pub is_compound: bool,
    /// 连接各条件的逻辑运算符, 单个条件时为 `None`
    pub logical_operator: Option<LogicalOperator>,
    /// 按输入顺序排列的条件列表
    pub conditions: Vec<Condition>,
}

impl CompoundResult {
    /// 单个条件的结果
    pub fn single(condition: Condition) -> Self {
        Self {
            is_compound: false,
            logical_operator: None,
            conditions: vec![condition],
        }
    }

    /// 由同一逻辑运算符连接的多个条件
    pub fn compound(logical_operator: LogicalOperator, conditions: Vec<Condition>) -> Self {
        Self {
            is_compound: true,
            logical_operator: Some(logical_operator),
            conditions,
        }
    }
}

/// 代表一个比较条件, 例如：`stock > 10`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    /// 原样保留的字段引用 (可能带点号或别名前缀)
    pub field: String,
    pub operator: Operator,
    pub value: Value,
    /// 原始子表达式文本, 用于诊断
    pub raw: String,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::IsNull | Operator::IsNotNull => write!(f, "{} {}", self.field, self.operator),
            _ => write!(f, "{} {} {}", self.field, self.operator, self.value),
        }
    }
}

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,        // =
    Neq,       // != 或 <>
    Gt,        // >
    Gte,       // >=
    Lt,        // <
    Lte,       // <=
    Like,      // LIKE
    In,        // IN
    NotIn,     // NOT IN
    IsNull,    // IS NULL
    IsNotNull, // IS NOT NULL
}

impl Operator {
    /// 规范的运算符文本
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }

    /// 从运算符文本查找运算符, 关键字不区分大小写
    pub fn from_token(text: &str) -> Option<Self> {
        crate::token::KEYWORD_OPERATORS
            .iter()
            .chain(crate::token::COMPARISON_OPERATORS.iter())
            .find(|t| t.text.eq_ignore_ascii_case(text.trim()))
            .map(|t| t.operator)
    }

    /// 空值检查运算符不携带值
    pub fn is_null_check(self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 逻辑运算符, 一个表达式中只使用一种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
