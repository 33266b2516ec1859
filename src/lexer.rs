//! 过滤表达式的词法扫描
//!
//! 扫描基于不区分大小写的子串查找, 而不是逐字符分词:
//! 引号中的关键字同样会被识别 (例如 `name = 'A AND B'` 会被当作复合表达式)。

use regex::Regex;
use std::sync::LazyLock;

use crate::ast::{LogicalOperator, Operator};
use crate::token::{Span, COMPARISON_OPERATORS, KEYWORD_OPERATORS, LOGICAL_OPERATORS};

static AND_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+AND\s+").expect("AND separator pattern is valid"));
static OR_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+OR\s+").expect("OR separator pattern is valid"));

/// 在一个子表达式中找到的运算符
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorMatch<'a> {
    pub operator: Operator,
    /// 运算符在输入中的位置 (关键字运算符包含前导空格)
    pub span: Span,
    /// 运算符之前的文本, 已去除首尾空白
    pub field: &'a str,
    /// 运算符之后的文本, 已去除首尾空白
    pub rest: &'a str,
}

pub struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input }
    }

    /// 不区分大小写地查找子串, 返回第一次出现的位置
    pub fn find(&self, needle: &str) -> Option<Span> {
        find_ignore_ascii_case(self.input, needle).map(|start| Span::new(start, start + needle.len()))
    }

    /// 检测顶层逻辑运算符: 先查找 `" AND "`, 再查找 `" OR "`
    pub fn logical_operator(&self) -> Option<LogicalOperator> {
        LOGICAL_OPERATORS
            .into_iter()
            .find(|op| self.find(&format!(" {} ", op.keyword())).is_some())
    }

    /// 按逻辑运算符 (两侧为空白) 切分输入, 每段去除首尾空白
    pub fn split(&self, operator: LogicalOperator) -> Vec<&'a str> {
        let separator = match operator {
            LogicalOperator::And => &*AND_SEPARATOR,
            LogicalOperator::Or => &*OR_SEPARATOR,
        };
        separator.split(self.input).map(str::trim).collect()
    }

    /// 查找简单表达式中的运算符
    ///
    /// 先按固定优先级查找关键字运算符 (`" NOT IN"`, `" IS NOT NULL"`, ...),
    /// 找不到时再按 `!=, <>, >=, <=, >, <, =` 的顺序查找比较运算符。
    pub fn match_operator(&self) -> Option<OperatorMatch<'a>> {
        for token in KEYWORD_OPERATORS {
            if let Some(span) = self.find(&format!(" {}", token.text)) {
                return Some(self.operator_match(token.operator, span));
            }
        }
        for token in COMPARISON_OPERATORS {
            if let Some(start) = self.input.find(token.text) {
                let span = Span::new(start, start + token.text.len());
                return Some(self.operator_match(token.operator, span));
            }
        }
        None
    }

    fn operator_match(&self, operator: Operator, span: Span) -> OperatorMatch<'a> {
        OperatorMatch {
            operator,
            span,
            field: self.input[..span.start].trim(),
            rest: self.input[span.end..].trim(),
        }
    }
}

/// 只比较 ASCII 字母的大小写; `needle` 是 ASCII, 所以返回的位置总在字符边界上
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let (haystack, needle) = (haystack.as_bytes(), needle.as_bytes());
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
