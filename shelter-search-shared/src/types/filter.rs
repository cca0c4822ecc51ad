//! Typed filter criteria (where-clauses).
//!
//! A [`WhereClause`] maps field names to [`FilterValue`]s. It is compiled to
//! the search provider's filter syntax by the repository crate; callers never
//! build filter strings themselves.

use chrono::{DateTime, Utc};

/// Inclusive date interval. Either bound may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub gte: Option<DateTime<Utc>>,
    pub lte: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(gte: Option<DateTime<Utc>>, lte: Option<DateTime<Utc>>) -> Self {
        Self { gte, lte }
    }

    /// Returns true if neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.gte.is_none() && self.lte.is_none()
    }
}

/// Value a single field is filtered on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Exact match.
    Scalar(String),
    /// Matches any of the values. An empty set does not filter.
    Set(Vec<String>),
    /// Matches values inside the range.
    Range(DateRange),
}

impl FilterValue {
    /// Exact match on the wire form of `value`.
    pub fn scalar(value: impl ToString) -> Self {
        Self::Scalar(value.to_string())
    }

    /// Match any of `values`, in iteration order.
    pub fn set<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self::Set(values.into_iter().map(|v| v.to_string()).collect())
    }

    pub fn range(gte: Option<DateTime<Utc>>, lte: Option<DateTime<Utc>>) -> Self {
        Self::Range(DateRange::new(gte, lte))
    }
}

/// Ordered mapping from field name to filter value.
///
/// Field order is preserved so the compiled expression is deterministic.
/// Setting a field twice replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    fields: Vec<(String, Option<FilterValue>)>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter on `name`.
    pub fn field(self, name: impl Into<String>, value: FilterValue) -> Self {
        self.maybe_field(name, Some(value))
    }

    /// Add a possibly-null filter on `name`. A `None` value does not filter.
    pub fn maybe_field(mut self, name: impl Into<String>, value: Option<FilterValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Option<FilterValue>) {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Iterate fields in insertion order, including null ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FilterValue>)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::enums::Species;

    #[test]
    fn test_set_uses_wire_form() {
        let value = FilterValue::set([Species::Cat, Species::Dog]);
        assert_eq!(
            value,
            FilterValue::Set(vec!["CAT".to_string(), "DOG".to_string()])
        );
    }

    #[test]
    fn test_where_clause_preserves_order_and_replaces() {
        let clause = WhereClause::new()
            .field("species", FilterValue::scalar("CAT"))
            .maybe_field("status", None)
            .field("species", FilterValue::scalar("DOG"));

        let fields: Vec<_> = clause.iter().map(|(name, _)| name).collect();
        assert_eq!(fields, vec!["species", "status"]);
        assert_eq!(clause.get("species"), Some(&FilterValue::scalar("DOG")));
        assert_eq!(clause.get("status"), None);
    }

    #[test]
    fn test_unbounded_range() {
        assert!(DateRange::default().is_unbounded());
        assert!(!DateRange::new(Some(Utc::now()), None).is_unbounded());
    }
}
