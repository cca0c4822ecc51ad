//! Query-string codecs for search filter forms.
//!
//! Filter forms persist their state in the URL so searches are bookmarkable
//! and shareable. Each filter field maps to exactly one query parameter key;
//! multi-valued fields repeat the key. Parsing is lenient: values that do not
//! parse for their field are dropped, so a stale or hand-edited URL degrades
//! to "no filter on that field" instead of failing.
//!
//! Parsed values are canonical (sets are ordered, free text is trimmed), so
//! comparing two parsed params with `==` is the equality used to detect the
//! active preset. `stringify` writes the same canonical form, so parsing its
//! output gives back `normalized()`.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use url::form_urlencoded;

use crate::types::enums::{AnimalStatus, Species, UserGroup};
use crate::types::filter::{FilterValue, WhereClause};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Decode `key=value` pairs, tolerating a leading `?`.
fn decode_pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes()).map(|(k, v)| (k.into_owned(), v.into_owned()))
}

/// Free-text values are trimmed; blank ones are absent.
fn parse_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn insert_parsed<T: FromStr + Ord>(set: &mut BTreeSet<T>, value: &str) {
    if let Ok(parsed) = value.parse() {
        set.insert(parsed);
    }
}

/// First instant of `date`, in UTC.
fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last millisecond of `date`, in UTC.
fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1) - Duration::milliseconds(1)
}

fn text_set(values: &BTreeSet<String>) -> BTreeSet<String> {
    values.iter().filter_map(|value| parse_text(value)).collect()
}

fn set_filter<T: std::fmt::Display>(values: &BTreeSet<T>) -> Option<FilterValue> {
    (!values.is_empty()).then(|| FilterValue::set(values))
}

/// Filter state of the animal search form.
///
/// | Field | Key |
/// |-------|-----|
/// | `text` | `q` |
/// | `species` | `species` (repeated) |
/// | `statuses` | `status` (repeated) |
/// | `pick_up_start_date` | `pickUpStartDate` (`YYYY-MM-DD`) |
/// | `pick_up_end_date` | `pickUpEndDate` (`YYYY-MM-DD`) |
/// | `pick_up_locations` | `pickUpLocation` (repeated) |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimalSearchParams {
    pub text: Option<String>,
    pub species: BTreeSet<Species>,
    pub statuses: BTreeSet<AnimalStatus>,
    pub pick_up_start_date: Option<NaiveDate>,
    pub pick_up_end_date: Option<NaiveDate>,
    pub pick_up_locations: BTreeSet<String>,
}

impl AnimalSearchParams {
    pub const TEXT_KEY: &'static str = "q";
    pub const SPECIES_KEY: &'static str = "species";
    pub const STATUS_KEY: &'static str = "status";
    pub const PICK_UP_START_DATE_KEY: &'static str = "pickUpStartDate";
    pub const PICK_UP_END_DATE_KEY: &'static str = "pickUpEndDate";
    pub const PICK_UP_LOCATION_KEY: &'static str = "pickUpLocation";

    /// Parse filter state from a URL query string.
    ///
    /// When a single-valued key is repeated, the last valid value wins.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();

        for (key, value) in decode_pairs(query) {
            match key.as_str() {
                Self::TEXT_KEY => {
                    if let Some(text) = parse_text(&value) {
                        params.text = Some(text);
                    }
                }
                Self::SPECIES_KEY => insert_parsed(&mut params.species, &value),
                Self::STATUS_KEY => insert_parsed(&mut params.statuses, &value),
                Self::PICK_UP_START_DATE_KEY => {
                    if let Some(date) = parse_date(&value) {
                        params.pick_up_start_date = Some(date);
                    }
                }
                Self::PICK_UP_END_DATE_KEY => {
                    if let Some(date) = parse_date(&value) {
                        params.pick_up_end_date = Some(date);
                    }
                }
                Self::PICK_UP_LOCATION_KEY => {
                    if let Some(location) = parse_text(&value) {
                        params.pick_up_locations.insert(location);
                    }
                }
                _ => {}
            }
        }

        params
    }

    /// The canonical form of this filter state, as `parse` produces it.
    pub fn normalized(&self) -> Self {
        Self {
            text: self.text.as_deref().and_then(parse_text),
            pick_up_locations: text_set(&self.pick_up_locations),
            ..self.clone()
        }
    }

    /// Encode filter state as a URL query string (without leading `?`).
    ///
    /// Absent fields are omitted; sets are written in canonical order. Text
    /// values are written trimmed and blank ones are omitted.
    pub fn stringify(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if let Some(text) = self.text.as_deref().and_then(parse_text) {
            serializer.append_pair(Self::TEXT_KEY, &text);
        }
        for species in &self.species {
            serializer.append_pair(Self::SPECIES_KEY, species.as_str());
        }
        for status in &self.statuses {
            serializer.append_pair(Self::STATUS_KEY, status.as_str());
        }
        if let Some(date) = self.pick_up_start_date {
            serializer.append_pair(
                Self::PICK_UP_START_DATE_KEY,
                &date.format(DATE_FORMAT).to_string(),
            );
        }
        if let Some(date) = self.pick_up_end_date {
            serializer.append_pair(
                Self::PICK_UP_END_DATE_KEY,
                &date.format(DATE_FORMAT).to_string(),
            );
        }
        for location in text_set(&self.pick_up_locations) {
            serializer.append_pair(Self::PICK_UP_LOCATION_KEY, &location);
        }

        serializer.finish()
    }

    /// Filter criteria for the animal index.
    ///
    /// Dates select whole days: the start date from its first instant, the
    /// end date up to its last millisecond.
    pub fn to_where_clause(&self) -> WhereClause {
        let pick_up_date = match (self.pick_up_start_date, self.pick_up_end_date) {
            (None, None) => None,
            (start, end) => Some(FilterValue::range(
                start.map(start_of_day),
                end.map(end_of_day),
            )),
        };

        WhereClause::new()
            .maybe_field("species", set_filter(&self.species))
            .maybe_field("status", set_filter(&self.statuses))
            .maybe_field("pickUpDate", pick_up_date)
            .maybe_field("pickUpLocation", set_filter(&text_set(&self.pick_up_locations)))
    }

    /// The full-text query, empty when matching everything.
    pub fn query(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or_default()
    }
}

/// Filter state of the user search form.
///
/// | Field | Key |
/// |-------|-----|
/// | `text` | `q` |
/// | `groups` | `group` (repeated) |
/// | `is_disabled` | `disabled` (`true` / `false`) |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSearchParams {
    pub text: Option<String>,
    pub groups: BTreeSet<UserGroup>,
    pub is_disabled: Option<bool>,
}

impl UserSearchParams {
    pub const TEXT_KEY: &'static str = "q";
    pub const GROUP_KEY: &'static str = "group";
    pub const DISABLED_KEY: &'static str = "disabled";

    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();

        for (key, value) in decode_pairs(query) {
            match key.as_str() {
                Self::TEXT_KEY => {
                    if let Some(text) = parse_text(&value) {
                        params.text = Some(text);
                    }
                }
                Self::GROUP_KEY => insert_parsed(&mut params.groups, &value),
                Self::DISABLED_KEY => {
                    if let Some(disabled) = parse_bool(&value) {
                        params.is_disabled = Some(disabled);
                    }
                }
                _ => {}
            }
        }

        params
    }

    pub fn normalized(&self) -> Self {
        Self {
            text: self.text.as_deref().and_then(parse_text),
            ..self.clone()
        }
    }

    pub fn stringify(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if let Some(text) = self.text.as_deref().and_then(parse_text) {
            serializer.append_pair(Self::TEXT_KEY, &text);
        }
        for group in &self.groups {
            serializer.append_pair(Self::GROUP_KEY, group.as_str());
        }
        if let Some(disabled) = self.is_disabled {
            serializer.append_pair(Self::DISABLED_KEY, if disabled { "true" } else { "false" });
        }

        serializer.finish()
    }

    pub fn to_where_clause(&self) -> WhereClause {
        WhereClause::new()
            .maybe_field("groups", set_filter(&self.groups))
            .maybe_field("isDisabled", self.is_disabled.map(FilterValue::scalar))
    }

    pub fn query(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_animal_params() {
        let params = AnimalSearchParams::parse(
            "?q=cara+mel&species=DOG&species=CAT&status=ADOPTED&pickUpStartDate=2023-01-15&pickUpLocation=Saint-%C3%89tienne",
        );

        assert_eq!(params.text.as_deref(), Some("cara mel"));
        assert_eq!(
            params.species,
            BTreeSet::from([Species::Cat, Species::Dog])
        );
        assert_eq!(params.statuses, BTreeSet::from([AnimalStatus::Adopted]));
        assert_eq!(params.pick_up_start_date, Some(date(2023, 1, 15)));
        assert_eq!(params.pick_up_end_date, None);
        assert_eq!(
            params.pick_up_locations,
            BTreeSet::from(["Saint-Étienne".to_string()])
        );
    }

    #[test]
    fn test_unknown_enum_value_is_dropped() {
        let with_junk = AnimalSearchParams::parse("species=CAT&species=UNICORN&status=lost");
        let without = AnimalSearchParams::parse("species=CAT");

        assert_eq!(with_junk, without);
    }

    #[test]
    fn test_invalid_date_is_dropped() {
        let params = AnimalSearchParams::parse("pickUpStartDate=2023-13-40&pickUpEndDate=yesterday");
        assert_eq!(params, AnimalSearchParams::default());
    }

    #[test]
    fn test_blank_text_is_absent() {
        assert_eq!(AnimalSearchParams::parse("q=+++").text, None);
        assert_eq!(AnimalSearchParams::parse("q=").query(), "");
    }

    #[test]
    fn test_stringify_is_canonical() {
        let a = AnimalSearchParams::parse("species=DOG&species=CAT");
        let b = AnimalSearchParams::parse("species=CAT&species=DOG");

        assert_eq!(a, b);
        assert_eq!(a.stringify(), "species=CAT&species=DOG");
        assert_eq!(AnimalSearchParams::default().stringify(), "");
    }

    #[test]
    fn test_stringify_trims_text_values() {
        let params = AnimalSearchParams {
            text: Some(" rex".to_string()),
            pick_up_locations: BTreeSet::from([
                String::new(),
                "  ".to_string(),
                "Lyon ".to_string(),
                "Lyon".to_string(),
            ]),
            ..Default::default()
        };

        assert_eq!(params.stringify(), "q=rex&pickUpLocation=Lyon");
        assert_eq!(params.query(), "rex");

        let parsed = AnimalSearchParams::parse(&params.stringify());
        assert_eq!(parsed.text.as_deref(), Some("rex"));
        assert_eq!(parsed.pick_up_locations, BTreeSet::from(["Lyon".to_string()]));
        assert_eq!(parsed, params.normalized());
        assert_eq!(
            params.to_where_clause().get("pickUpLocation"),
            Some(&FilterValue::set(["Lyon"]))
        );
    }

    #[test]
    fn test_blank_values_stringify_to_nothing() {
        let animal = AnimalSearchParams {
            text: Some("   ".to_string()),
            pick_up_locations: BTreeSet::from([String::new()]),
            ..Default::default()
        };
        assert_eq!(animal.stringify(), "");
        assert_eq!(AnimalSearchParams::parse(&animal.stringify()), AnimalSearchParams::default());
        assert_eq!(animal.to_where_clause().get("pickUpLocation"), None);

        let user = UserSearchParams {
            text: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(user.stringify(), "");
        assert_eq!(UserSearchParams::parse(&user.stringify()), UserSearchParams::default());
    }

    #[test]
    fn test_parse_trims_locations() {
        let params = AnimalSearchParams::parse("pickUpLocation=+Lyon+&pickUpLocation=Lyon&pickUpLocation=+");
        assert_eq!(params.pick_up_locations, BTreeSet::from(["Lyon".to_string()]));
    }

    #[test]
    fn test_stringify_dates_without_time() {
        let params = AnimalSearchParams {
            pick_up_start_date: Some(date(2023, 3, 1)),
            pick_up_end_date: Some(date(2023, 3, 31)),
            ..Default::default()
        };

        assert_eq!(
            params.stringify(),
            "pickUpStartDate=2023-03-01&pickUpEndDate=2023-03-31"
        );
    }

    #[test]
    fn test_animal_where_clause() {
        let params = AnimalSearchParams {
            species: BTreeSet::from([Species::Dog, Species::Cat]),
            pick_up_start_date: Some(date(2023, 3, 1)),
            pick_up_end_date: Some(date(2023, 3, 31)),
            ..Default::default()
        };

        let clause = params.to_where_clause();

        assert_eq!(clause.get("species"), Some(&FilterValue::set(["CAT", "DOG"])));
        assert_eq!(clause.get("status"), None);
        assert_eq!(clause.get("pickUpLocation"), None);
        assert_eq!(
            clause.get("pickUpDate"),
            Some(&FilterValue::range(
                Some(Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap()),
                Some(
                    Utc.with_ymd_and_hms(2023, 3, 31, 23, 59, 59).unwrap()
                        + Duration::milliseconds(999)
                ),
            ))
        );
    }

    #[test]
    fn test_user_params() {
        let params = UserSearchParams::parse("group=ADMIN&group=nope&disabled=maybe&disabled=true");

        assert_eq!(params.groups, BTreeSet::from([UserGroup::Admin]));
        assert_eq!(params.is_disabled, Some(true));
        assert_eq!(params.stringify(), "group=ADMIN&disabled=true");

        let clause = params.to_where_clause();
        assert_eq!(clause.get("isDisabled"), Some(&FilterValue::scalar("true")));
        assert_eq!(clause.get("groups"), Some(&FilterValue::set(["ADMIN"])));
    }

    fn naive_date() -> impl Strategy<Value = NaiveDate> {
        (2000i32..2035, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| date(y, m, d))
    }

    fn text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9éà&=+%?]{1,12}( [a-zA-Z0-9]{1,12})?"
    }

    /// Any text a caller may put in a field, padding and blanks included.
    fn raw_text() -> impl Strategy<Value = String> {
        prop_oneof![
            text(),
            Just(String::new()),
            "[ \t\n]{1,3}",
            ("[ \t]{0,2}", text(), "[ \t\n]{0,2}")
                .prop_map(|(head, body, tail)| format!("{head}{body}{tail}")),
        ]
    }

    fn animal_params() -> impl Strategy<Value = AnimalSearchParams> {
        (
            proptest::option::of(raw_text()),
            proptest::collection::btree_set(proptest::sample::select(Species::ALL), 0..=3),
            proptest::collection::btree_set(proptest::sample::select(AnimalStatus::ALL), 0..=4),
            proptest::option::of(naive_date()),
            proptest::option::of(naive_date()),
            proptest::collection::btree_set(raw_text(), 0..=3),
        )
            .prop_map(|(text, species, statuses, start, end, locations)| {
                AnimalSearchParams {
                    text,
                    species,
                    statuses,
                    pick_up_start_date: start,
                    pick_up_end_date: end,
                    pick_up_locations: locations,
                }
            })
    }

    fn user_params() -> impl Strategy<Value = UserSearchParams> {
        (
            proptest::option::of(raw_text()),
            proptest::collection::btree_set(proptest::sample::select(UserGroup::ALL), 0..=3),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(text, groups, is_disabled)| UserSearchParams {
                text,
                groups,
                is_disabled,
            })
    }

    proptest! {
        #[test]
        fn prop_animal_params_round_trip(params in animal_params()) {
            let parsed = AnimalSearchParams::parse(&params.stringify());
            let normalized = params.normalized();
            prop_assert_eq!(parsed.stringify(), params.stringify());
            prop_assert_eq!(&parsed, &normalized);
            prop_assert_eq!(AnimalSearchParams::parse(&parsed.stringify()), parsed);
        }

        #[test]
        fn prop_user_params_round_trip(params in user_params()) {
            let parsed = UserSearchParams::parse(&params.stringify());
            let normalized = params.normalized();
            prop_assert_eq!(parsed.stringify(), params.stringify());
            prop_assert_eq!(&parsed, &normalized);
            prop_assert_eq!(UserSearchParams::parse(&parsed.stringify()), parsed);
        }
    }
}
