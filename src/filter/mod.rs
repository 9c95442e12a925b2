//! Sort-key filters for collection queries.
//!
//! A [`SortKeyFilter`] captures an operator and its comparison value(s)
//! without any knowledge of the configured sort-key attribute name. The
//! component issuing the query injects the attribute name through
//! [`SortKeyFilter::key_condition`], which renders the final expression
//! fragment. This two-stage shape keeps filter construction decoupled from
//! table configuration.
//!
//! Comparison values are coerced to their string representation, matching
//! the sort key's stored form.

use std::collections::HashMap;

/// A sort-key predicate for a collection query.
///
/// Constructed through the associated functions, then consumed by
/// [`CollectionRef::get_filtered`](crate::CollectionRef::get_filtered).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKeyFilter {
    /// Sort key equals the value.
    Equal(String),
    /// Sort key is strictly less than the value.
    LessThan(String),
    /// Sort key is less than or equal to the value.
    LessOrEqual(String),
    /// Sort key is strictly greater than the value.
    GreaterThan(String),
    /// Sort key is greater than or equal to the value.
    GreaterOrEqual(String),
    /// Sort key lies between the two values, inclusive. Min comes first.
    Between(String, String),
    /// Sort key starts with the given string prefix.
    BeginsWith(String),
}

impl SortKeyFilter {
    pub fn equal(value: impl ToString) -> Self {
        Self::Equal(value.to_string())
    }

    pub fn less_than(value: impl ToString) -> Self {
        Self::LessThan(value.to_string())
    }

    pub fn less_or_equal(value: impl ToString) -> Self {
        Self::LessOrEqual(value.to_string())
    }

    pub fn greater_than(value: impl ToString) -> Self {
        Self::GreaterThan(value.to_string())
    }

    pub fn greater_or_equal(value: impl ToString) -> Self {
        Self::GreaterOrEqual(value.to_string())
    }

    /// Inclusive range; `min` must be supplied first.
    pub fn between(min: impl ToString, max: impl ToString) -> Self {
        Self::Between(min.to_string(), max.to_string())
    }

    pub fn begins_with(prefix: impl ToString) -> Self {
        Self::BeginsWith(prefix.to_string())
    }

    /// Render the predicate fragment for the given sort-key attribute name.
    pub fn key_condition(&self, sort_key_attribute: &str) -> KeyCondition {
        let names = HashMap::from([("#SK".to_string(), sort_key_attribute.to_string())]);

        let (expression, values) = match self {
            Self::Equal(value) => ("#SK = :SK", vec![(":SK", value.clone())]),
            Self::LessThan(value) => ("#SK < :SK", vec![(":SK", value.clone())]),
            Self::LessOrEqual(value) => ("#SK <= :SK", vec![(":SK", value.clone())]),
            Self::GreaterThan(value) => ("#SK > :SK", vec![(":SK", value.clone())]),
            Self::GreaterOrEqual(value) => ("#SK >= :SK", vec![(":SK", value.clone())]),
            Self::Between(min, max) => (
                "#SK BETWEEN :SKMIN AND :SKMAX",
                vec![(":SKMIN", min.clone()), (":SKMAX", max.clone())],
            ),
            Self::BeginsWith(prefix) => ("begins_with(#SK, :SK)", vec![(":SK", prefix.clone())]),
        };

        KeyCondition {
            expression: expression.to_string(),
            names,
            values: values
                .into_iter()
                .map(|(placeholder, value)| (placeholder.to_string(), value))
                .collect(),
        }
    }
}

/// A rendered key-condition fragment: an expression template over
/// placeholder names plus the maps resolving those placeholders to the
/// real attribute name and literal comparison values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyCondition {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, String>,
}
