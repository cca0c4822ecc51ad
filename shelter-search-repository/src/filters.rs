//! Compilation of where-clauses into the provider's filter syntax.
//!
//! Fields are joined with ` AND `, values of a multi-valued field with ` OR `.
//! Date ranges are compared on epoch milliseconds. The builder performs no
//! validation: an inverted range simply matches nothing.

use shelter_search_shared::{DateRange, FilterValue, WhereClause};

/// Compile a where-clause into a filter expression.
///
/// Returns `None` when no field restricts the results, so callers can omit
/// the filter parameter altogether. Null fields, empty sets and unbounded
/// ranges contribute nothing.
///
/// ```
/// use shelter_search_repository::filters::build_filter_expression;
/// use shelter_search_shared::{FilterValue, WhereClause};
///
/// let clause = WhereClause::new()
///     .field("species", FilterValue::set(["CAT", "DOG"]))
///     .field("status", FilterValue::set(["OPEN_TO_ADOPTION"]));
///
/// assert_eq!(
///     build_filter_expression(&clause).as_deref(),
///     Some("(species:CAT OR species:DOG) AND status:OPEN_TO_ADOPTION"),
/// );
/// ```
pub fn build_filter_expression(clause: &WhereClause) -> Option<String> {
    let clauses: Vec<String> = clause
        .iter()
        .filter_map(|(field, value)| value.and_then(|value| field_clause(field, value)))
        .collect();

    match clauses.len() {
        0 => None,
        1 => clauses.into_iter().next(),
        _ => Some(
            clauses
                .into_iter()
                .map(|clause| {
                    if clause.contains(" OR ") {
                        format!("({})", clause)
                    } else {
                        clause
                    }
                })
                .collect::<Vec<_>>()
                .join(" AND "),
        ),
    }
}

fn field_clause(field: &str, value: &FilterValue) -> Option<String> {
    match value {
        FilterValue::Scalar(value) => Some(format!("{}:{}", field, value)),
        FilterValue::Set(values) if values.is_empty() => None,
        FilterValue::Set(values) => Some(
            values
                .iter()
                .map(|value| format!("{}:{}", field, value))
                .collect::<Vec<_>>()
                .join(" OR "),
        ),
        FilterValue::Range(range) => range_clause(field, range),
    }
}

// Bounded ranges use the `field:a TO b` form while single bounds use
// comparison operators; the provider accepts both only in these shapes.
fn range_clause(field: &str, range: &DateRange) -> Option<String> {
    match (range.gte, range.lte) {
        (Some(gte), Some(lte)) => Some(format!(
            "{}:{} TO {}",
            field,
            gte.timestamp_millis(),
            lte.timestamp_millis()
        )),
        (Some(gte), None) => Some(format!("{} >= {}", field, gte.timestamp_millis())),
        (None, Some(lte)) => Some(format!("{} <= {}", field, lte.timestamp_millis())),
        (None, None) => None,
    }
}
