//! 过滤表达式的语法分析器
//!
//! ## 解析流程图
//!
//! ```text
//! parse()
//!   ├─ 去除首尾空白
//!   ├─ Lexer::logical_operator() 检测 " AND " / " OR "
//!   │   ├─ 找到 → Lexer::split() 按该运算符切分
//!   │   │          └─ 每一段 → parse_simple()
//!   │   └─ 未找到 → 整个输入 → parse_simple()
//!   │
//!   └─ parse_simple()
//!        ├─ Lexer::match_operator()
//!        │    ├─ 关键字运算符 NOT IN, IS NOT NULL, IS NULL, LIKE, IN
//!        │    └─ 比较运算符 !=, <>, >=, <=, >, <, =
//!        ├─ 空值检查运算符 → 值固定为 Null
//!        ├─ 其他 → value::coerce() 转换运算符之后的文本
//!        └─ 未找到运算符 → InvalidOperator
//! ```
//!
//! ## 已知限制
//!
//! - 一个表达式只支持一种逻辑运算符, 同时包含 AND 和 OR 时按 AND 切分
//! - 逻辑运算符的检测不识别引号, `name = 'A AND B'` 会被切分为两段
//! - 关键字运算符按子串查找, `" IN"` 也会匹配以 `in` 开头的单词 (例如 `= inactive`)
//!
//! ## 解析示例
//!
//! ```text
//! stock > 10
//! stock > 10 AND active = true
//! name NOT IN ('a', 'b')
//! deleted_at IS NOT NULL
//! ```

use tracing::debug;

use crate::ast::{CompoundResult, Condition};
use crate::error::{ParseError, QueryError};
use crate::lexer::Lexer;
use crate::value::{self, Value};

/// 无状态的表达式解析器, 可以在多个调用方之间共享
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, expression: &str) -> Result<CompoundResult, ParseError> {
        let expression = expression.trim();
        let lexer = Lexer::new(expression);

        let result = match lexer.logical_operator() {
            Some(logical) => {
                let conditions = lexer
                    .split(logical)
                    .into_iter()
                    .map(|segment| self.parse_simple(segment))
                    .collect::<Result<Vec<_>, _>>()?;
                CompoundResult::compound(logical, conditions)
            }
            None => CompoundResult::single(self.parse_simple(expression)?),
        };

        debug!(
            expression,
            conditions = result.conditions.len(),
            logical = ?result.logical_operator,
            "parsed filter expression"
        );
        Ok(result)
    }

    /// 解析不含逻辑运算符的单个比较
    pub fn parse_simple(&self, expression: &str) -> Result<Condition, ParseError> {
        let expression = expression.trim();
        let Some(found) = Lexer::new(expression).match_operator() else {
            return Err(QueryError::invalid_operator(expression));
        };

        let value = if found.operator.is_null_check() {
            Value::Null
        } else {
            value::coerce(Some(found.rest))
        };

        Ok(Condition {
            field: found.field.to_string(),
            operator: found.operator,
            value,
            raw: expression.to_string(),
        })
    }
}

/// `Parser::new().parse(expression)` 的简写
pub fn parse(expression: &str) -> Result<CompoundResult, ParseError> {
    Parser::new().parse(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{LogicalOperator, Operator};

    fn single(expression: &str) -> Condition {
        let result = parse(expression).unwrap();
        assert!(!result.is_compound);
        assert_eq!(result.logical_operator, None);
        assert_eq!(result.conditions.len(), 1);
        result.conditions.into_iter().next().unwrap()
    }

    #[test]
    fn test_simple_comparison() {
        let condition = single("stock > 10");
        assert_eq!(condition.field, "stock");
        assert_eq!(condition.operator, Operator::Gt);
        assert_eq!(condition.value, Value::Int(10));
        assert_eq!(condition.raw, "stock > 10");
    }

    #[test]
    fn test_every_operator() {
        let cases = [
            ("price = 5", Operator::Eq, Value::Int(5)),
            ("price != 5", Operator::Neq, Value::Int(5)),
            ("price <> 5", Operator::Neq, Value::Int(5)),
            ("price > 5", Operator::Gt, Value::Int(5)),
            ("price >= 5", Operator::Gte, Value::Int(5)),
            ("price < 5.5", Operator::Lt, Value::Float(5.5)),
            ("price <= 5", Operator::Lte, Value::Int(5)),
            ("name LIKE '%phone%'", Operator::Like, Value::Text("%phone%".into())),
            ("id IN (1, 2)", Operator::In, Value::List(vec![Value::Int(1), Value::Int(2)])),
            ("id NOT IN (3)", Operator::NotIn, Value::List(vec![Value::Int(3)])),
            ("deleted_at IS NULL", Operator::IsNull, Value::Null),
            ("deleted_at IS NOT NULL", Operator::IsNotNull, Value::Null),
        ];
        for (expression, operator, value) in cases {
            let condition = single(expression);
            assert_eq!(condition.operator, operator, "{expression}");
            assert_eq!(condition.value, value, "{expression}");
            assert_eq!(condition.field, expression.split(' ').next().unwrap());
        }
    }

    #[test]
    fn test_compound_and() {
        let result = parse("stock > 10 AND active = true").unwrap();
        assert!(result.is_compound);
        assert_eq!(result.logical_operator, Some(LogicalOperator::And));
        assert_eq!(result.conditions.len(), 2);
        assert_eq!(result.conditions[0].field, "stock");
        assert_eq!(result.conditions[0].value, Value::Int(10));
        assert_eq!(result.conditions[1].field, "active");
        assert_eq!(result.conditions[1].value, Value::Bool(true));
        assert_eq!(result.conditions[1].raw, "active = true");
    }

    #[test]
    fn test_compound_or_lowercase() {
        let result = parse("  status = 'open' or status = 'pending' or priority >= 3 ").unwrap();
        assert_eq!(result.logical_operator, Some(LogicalOperator::Or));
        let fields: Vec<_> = result.conditions.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["status", "status", "priority"]);
    }

    #[test]
    fn test_not_in_is_not_split_as_in() {
        let condition = single("name NOT IN ('a','b')");
        assert_eq!(condition.field, "name");
        assert_eq!(condition.operator, Operator::NotIn);
        assert_eq!(
            condition.value,
            Value::List(vec![Value::Text("a".into()), Value::Text("b".into())])
        );
    }

    #[test]
    fn test_null_check_ignores_trailing_text() {
        let condition = single("deleted_at IS NOT NULL whatever");
        assert_eq!(condition.operator, Operator::IsNotNull);
        assert_eq!(condition.value, Value::Null);
        assert_eq!(condition.field, "deleted_at");
    }

    #[test]
    fn test_operator_without_value() {
        let condition = single("name LIKE");
        assert_eq!(condition.operator, Operator::Like);
        assert_eq!(condition.value, Value::Null);
    }

    #[test]
    fn test_dotted_and_aliased_fields_are_kept_verbatim() {
        let condition = single("m.country.code = 'DE'");
        assert_eq!(condition.field, "m.country.code");
        assert_eq!(condition.value, Value::Text("DE".into()));
    }

    #[test]
    fn test_invalid_expression() {
        let err = parse("garbage").unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidOperator {
                expression: "garbage".to_string()
            }
        );
        assert!(err.to_string().contains("garbage"));
    }

    #[test]
    fn test_invalid_segment_in_compound() {
        let err = parse("stock > 1 AND nonsense").unwrap_err();
        assert!(matches!(err, QueryError::InvalidOperator { ref expression } if expression == "nonsense"));
    }

    #[test]
    fn test_quoted_logical_keyword_is_split() {
        // documents current behaviour: detection does not respect quotes
        let err = parse("name = 'A AND B'").unwrap_err();
        assert_eq!(err, QueryError::invalid_operator("B'"));

        let result = parse("name = 'A AND B = C'").unwrap();
        assert!(result.is_compound);
        assert_eq!(result.conditions.len(), 2);
        assert_eq!(result.conditions[0].value, Value::Text("'A".into()));
        assert_eq!(result.conditions[1].field, "B");
        assert_eq!(result.conditions[1].value, Value::Text("C'".into()));
    }

    #[test]
    fn test_mixed_logical_operators_split_on_and() {
        // documents current behaviour: a single logical operator per expression
        let result = parse("a = 1 OR b = 2 AND c = 3").unwrap();
        assert_eq!(result.logical_operator, Some(LogicalOperator::And));
        assert_eq!(result.conditions.len(), 2);
        assert_eq!(result.conditions[0].raw, "a = 1 OR b = 2");
        assert_eq!(result.conditions[0].value, Value::Text("1 OR b = 2".into()));
    }

    #[test]
    fn test_in_keyword_inside_word() {
        // documents current behaviour: " IN" is a substring search
        let condition = single("status = inactive");
        assert_eq!(condition.operator, Operator::In);
        assert_eq!(condition.field, "status =");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = Parser::new();
        let first = parser.parse("stock > 10 AND m.name LIKE 'A%'").unwrap();
        let second = parser.parse("stock > 10 AND m.name LIKE 'A%'").unwrap();
        assert_eq!(first, second);
    }
}
