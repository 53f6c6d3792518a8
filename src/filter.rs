//! Predicates over JSON documents.
//!
//! A [`Filter`] is what a parsed `WHERE` clause compiles to. Fields are
//! addressed with dot notation relative to the document root
//! (`"address.city"`).
//!
//! # Example
//!
//! ```
//! use getstarted::Filter;
//! use serde_json::json;
//!
//! let filter = Filter::and([
//!     Filter::eq("lastName", "Andersen"),
//!     Filter::gte("address.state", "WA"),
//! ]);
//! assert!(filter.evaluate(&json!({
//!     "lastName": "Andersen",
//!     "address": {"state": "WA"}
//! })));
//! ```

use serde_json::Value;
use std::cmp::Ordering;

/// Comparison applied between a document field and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=` / `<>`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
}

impl CompareOp {
    fn apply(self, field_value: &Value, literal: &Value) -> bool {
        match self {
            Self::Eq => values_equal(field_value, literal),
            Self::Ne => !values_equal(field_value, literal),
            Self::Gt => compare_values(field_value, literal) == Some(Ordering::Greater),
            Self::Gte => matches!(
                compare_values(field_value, literal),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Lt => compare_values(field_value, literal) == Some(Ordering::Less),
            Self::Lte => matches!(
                compare_values(field_value, literal),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

/// A predicate over a JSON document.
///
/// # Missing Fields
///
/// A comparison against a field the document does not have is `false`,
/// for every operator including `Ne`.
///
/// # Type Coercion
///
/// Numbers compare by value (`5` equals `5.0`). Values of different JSON
/// types are never ordered, so range comparisons between them are `false`.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field <op> value`
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },

    /// `field IN (values...)`
    In { field: String, values: Vec<Value> },

    /// Logical NOT.
    Not(Box<Filter>),

    /// Logical AND: all filters must match.
    And(Vec<Filter>),

    /// Logical OR: any filter must match.
    Or(Vec<Filter>),
}

impl Filter {
    /// Build a comparison.
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// Inequality filter.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    /// Greater-than filter.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    /// Greater-than-or-equal filter.
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    /// Less-than filter.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    /// Less-than-or-equal filter.
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    /// Membership filter.
    pub fn in_(field: impl Into<String>, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Negate a filter.
    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }

    /// Logical AND.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::And(filters.into_iter().collect())
    }

    /// Logical OR.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::Or(filters.into_iter().collect())
    }

    /// Evaluate this filter against a document.
    pub fn evaluate(&self, doc: &Value) -> bool {
        match self {
            Self::Compare { field, op, value } => match get_field(doc, field) {
                Some(field_value) => op.apply(field_value, value),
                None => false,
            },
            Self::In { field, values } => match get_field(doc, field) {
                Some(field_value) => values.iter().any(|v| values_equal(field_value, v)),
                None => false,
            },
            Self::Not(inner) => !inner.evaluate(doc),
            Self::And(filters) => filters.iter().all(|f| f.evaluate(doc)),
            Self::Or(filters) => filters.iter().any(|f| f.evaluate(doc)),
        }
    }

    /// The value this filter requires `field` to equal, if every match must
    /// satisfy `field = value`.
    ///
    /// Used to decide whether a query is confined to one partition.
    pub fn pinned_value(&self, field: &str) -> Option<&Value> {
        match self {
            Self::Compare {
                field: f,
                op: CompareOp::Eq,
                value,
            } if f == field => Some(value),
            Self::In { field: f, values } if f == field && values.len() == 1 => values.first(),
            Self::And(filters) => filters.iter().find_map(|f| f.pinned_value(field)),
            _ => None,
        }
    }
}

/// Get a field from a JSON value using dot notation.
///
/// ```
/// use serde_json::json;
///
/// let doc = json!({"address": {"city": "Seattle"}});
/// assert_eq!(
///     getstarted::filter::get_field(&doc, "address.city"),
///     Some(&json!("Seattle"))
/// );
/// assert_eq!(getstarted::filter::get_field(&doc, "address.zip"), None);
/// ```
pub fn get_field<'a>(doc: &'a Value, field: &str) -> Option<&'a Value> {
    field.split('.').try_fold(doc, |current, part| match current {
        Value::Object(map) => map.get(part),
        _ => None,
    })
}

/// Order two JSON values of the same type; numbers coerce between int and float.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a_num), Value::Number(b_num)) => {
            a_num.as_f64()?.partial_cmp(&b_num.as_f64()?)
        }
        (Value::String(a_str), Value::String(b_str)) => Some(a_str.cmp(b_str)),
        (Value::Bool(a_bool), Value::Bool(b_bool)) => Some(a_bool.cmp(b_bool)),
        _ => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a_num), Value::Number(b_num)) => match (a_num.as_f64(), b_num.as_f64()) {
            (Some(a_f64), Some(b_f64)) => (a_f64 - b_f64).abs() < f64::EPSILON,
            _ => false,
        },
        _ => a == b,
    }
}
