//! Typed values and the coercion of raw value tokens into them.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("numeric pattern is valid")
});

/// A typed condition payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Produced by `(a, b, c)` syntax. Elements are never lists themselves.
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Converts a raw value token into a [`Value`].
///
/// Rules, first match wins:
/// 1. absent or empty token is `Null`
/// 2. `NULL` (any case) is `Null`
/// 3. `true` / `false` (any case) is `Bool`
/// 4. a token wrapped in matching `'` or `"` is `Text` of the inner content,
///    without escape processing
/// 5. `(a, b, c)` is a `List` whose parts are coerced with rules 1-4, 6, 7
/// 6. a numeric literal is `Int` when it has no decimal point, else `Float`
/// 7. anything else is `Text` verbatim
///
/// Never fails: malformed numbers fall through to rule 7.
pub fn coerce(token: Option<&str>) -> Value {
    match token {
        Some(token) => coerce_token(token, true),
        None => Value::Null,
    }
}

/// Shorthand for `coerce(Some(token))`.
pub fn coerce_str(token: &str) -> Value {
    coerce_token(token, true)
}

fn coerce_token(token: &str, allow_list: bool) -> Value {
    let token = token.trim();
    if token.is_empty() || token.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if token.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Some(inner) = unquote(token) {
        return Value::Text(inner.to_string());
    }
    if allow_list {
        if let Some(body) = token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            return Value::List(coerce_list(body));
        }
    }
    if let Some(number) = parse_number(token) {
        return number;
    }
    Value::Text(token.to_string())
}

fn coerce_list(body: &str) -> Vec<Value> {
    if body.trim().is_empty() {
        return Vec::new();
    }
    body.split(',').map(|part| coerce_token(part, false)).collect()
}

/// Strips one pair of matching outer quotes.
fn unquote(token: &str) -> Option<&str> {
    let first = token.chars().next()?;
    if !matches!(first, '\'' | '"') || token.len() < 2 {
        return None;
    }
    token.strip_prefix(first)?.strip_suffix(first)
}

fn parse_number(token: &str) -> Option<Value> {
    if !NUMERIC.is_match(token) {
        return None;
    }
    if !token.contains('.') {
        if let Ok(int) = token.parse::<i64>() {
            return Some(Value::Int(int));
        }
    }
    let float = token.parse::<f64>().ok().filter(|x| x.is_finite())?;
    // exponent forms without a decimal point stay integral while they fit in i64
    let integral = float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64;
    if !token.contains('.') && integral {
        return Some(Value::Int(float as i64));
    }
    Some(Value::Float(float))
}
