use crate::errors::{FolioError, Result};
use crate::model::ContentDocument;
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;
pub const CREATED_AT: &str = "createdAt";

/// Comparison applied by a field filter. `Eq` is implied by a bare `field=value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FromStr for FilterOp {
    type Err = FolioError;

    /// Parses the token found between brackets in `field[token]`.
    fn from_str(token: &str) -> Result<Self> {
        match token {
            "gt" => Ok(FilterOp::Gt),
            "gte" => Ok(FilterOp::Gte),
            "lt" => Ok(FilterOp::Lt),
            "lte" => Ok(FilterOp::Lte),
            other => Err(FolioError::Invalid(format!(
                "unsupported filter operator '{other}'"
            ))),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterOp::Eq => "eq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
        };
        f.write_str(s)
    }
}

impl FilterOp {
    fn accepts(self, ord: Ordering) -> bool {
        match self {
            FilterOp::Eq => ord == Ordering::Equal,
            FilterOp::Gt => ord == Ordering::Greater,
            FilterOp::Gte => ord != Ordering::Less,
            FilterOp::Lt => ord == Ordering::Less,
            FilterOp::Lte => ord != Ordering::Greater,
        }
    }
}

/// Filter value parsed once into the type it is compared as.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Operand {
    pub fn parse(raw: &str, op: FilterOp) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return Operand::Number(n);
            }
        }
        if op == FilterOp::Eq {
            match trimmed {
                "true" => return Operand::Bool(true),
                "false" => return Operand::Bool(false),
                _ => {}
            }
        }
        Operand::Text(raw.to_string())
    }

    /// Orders a document value relative to this operand, or `None` when the
    /// two are not comparable (e.g. a numeric bound against free text).
    fn compare(&self, doc: &JsonValue) -> Option<Ordering> {
        match self {
            Operand::Number(n) => as_number(doc)?.partial_cmp(n),
            Operand::Bool(b) => doc.as_bool().map(|d| d.cmp(b)),
            Operand::Text(t) => {
                let s = doc.as_str()?;
                match (parse_timestamp(s), parse_timestamp(t)) {
                    (Some(a), Some(b)) => Some(a.cmp(&b)),
                    _ => Some(s.cmp(t.as_str())),
                }
            }
        }
    }
}

/// One `field[op]=value` constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub operand: Operand,
    raw: String,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, op: FilterOp, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            field: field.into(),
            op,
            operand: Operand::parse(&raw, op),
            raw,
        }
    }

    /// Parses a query-string pair such as `price[gte]=100` or `category=tech`.
    pub fn parse(key: &str, value: &str) -> Result<Self> {
        let (field, op) = match key.find('[') {
            None => (key, FilterOp::Eq),
            Some(open) => {
                let inner = key[open + 1..]
                    .strip_suffix(']')
                    .filter(|t| !t.contains('[') && !t.contains(']'))
                    .ok_or_else(|| {
                        FolioError::Invalid(format!("malformed filter parameter '{key}'"))
                    })?;
                (&key[..open], inner.parse::<FilterOp>()?)
            }
        };
        if field.is_empty() || field.contains(']') {
            return Err(FolioError::Invalid(format!(
                "malformed filter parameter '{key}'"
            )));
        }
        Ok(Self::new(field, op, value))
    }

    pub fn matches(&self, doc: &ContentDocument) -> bool {
        let Some(value) = doc.field(&self.field) else {
            return false;
        };
        match &*value {
            // any element satisfying the constraint is enough
            JsonValue::Array(items) => items.iter().any(|v| self.matches_value(v)),
            v => self.matches_value(v),
        }
    }

    fn matches_value(&self, v: &JsonValue) -> bool {
        // stored text is matched as text, so "1.10" never equals "1.1"
        if let (FilterOp::Eq, JsonValue::String(s)) = (self.op, v) {
            return *s == self.raw
                || matches!(
                    (parse_timestamp(s), parse_timestamp(&self.raw)),
                    (Some(a), Some(b)) if a == b
                );
        }
        match self.operand.compare(v) {
            Some(ord) => self.op.accepts(ord),
            None => self.op == FilterOp::Eq && v.as_str() == Some(self.raw.as_str()),
        }
    }
}

/// Case-insensitive, unanchored substring match on a title-like field.
#[derive(Debug, Clone)]
pub struct TitleMatch {
    pub field: String,
    pub keyword: String,
    pattern: Regex,
}

impl TitleMatch {
    pub fn new(field: impl Into<String>, keyword: impl Into<String>) -> Result<Self> {
        let keyword = keyword.into();
        let pattern = RegexBuilder::new(&regex::escape(&keyword))
            .case_insensitive(true)
            .build()
            .map_err(|e| FolioError::Invalid(format!("keyword: {e}")))?;
        Ok(Self {
            field: field.into(),
            keyword,
            pattern,
        })
    }

    pub fn matches(&self, doc: &ContentDocument) -> bool {
        doc.field(&self.field)
            .and_then(|v| v.as_str().map(|s| self.pattern.is_match(s)))
            .unwrap_or(false)
    }
}

impl PartialEq for TitleMatch {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.keyword == other.keyword
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

/// Ordering keys, applied left to right, then the insertion sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec(pub Vec<SortKey>);

impl Default for SortSpec {
    fn default() -> Self {
        Self::latest_first()
    }
}

impl SortSpec {
    pub fn latest_first() -> Self {
        SortSpec(vec![SortKey {
            field: CREATED_AT.to_string(),
            direction: Direction::Desc,
        }])
    }

    /// `price` ascending, `-price` descending, comma separated for several keys.
    /// Blank input falls back to newest first.
    pub fn parse(raw: Option<&str>) -> Self {
        let keys: Vec<SortKey> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter_map(|part| {
                let (field, direction) = match part.strip_prefix('-') {
                    Some(f) => (f, Direction::Desc),
                    None => (part.strip_prefix('+').unwrap_or(part), Direction::Asc),
                };
                let field = field.trim();
                (!field.is_empty()).then(|| SortKey {
                    field: field.to_string(),
                    direction,
                })
            })
            .collect();
        if keys.is_empty() {
            Self::latest_first()
        } else {
            SortSpec(keys)
        }
    }

    pub fn compare(&self, a: &ContentDocument, b: &ContentDocument) -> Ordering {
        for key in &self.0 {
            let av = a.field(&key.field);
            let bv = b.field(&key.field);
            let ord = match (av.as_deref(), bv.as_deref()) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => compare_json(x, y),
            };
            let ord = match key.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        let tie = a.seq.cmp(&b.seq);
        match self.0.first().map(|k| k.direction) {
            Some(Direction::Desc) => tie.reverse(),
            _ => tie,
        }
    }
}

/// Skip/limit pair applied after filtering and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub page: usize,
    pub skip: usize,
    pub limit: usize,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            page: 1,
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Window {
    /// Invalid page or page-size values (zero, negative, non-numeric) fall back
    /// to 1 and `default_limit`; the limit never exceeds `max_limit`.
    pub fn from_params(
        page: Option<&str>,
        page_size: Option<&str>,
        default_limit: usize,
        max_limit: usize,
    ) -> Self {
        let max_limit = max_limit.max(1);
        let page = page.and_then(parse_positive).unwrap_or(1);
        let limit = page_size
            .and_then(parse_positive)
            .unwrap_or(default_limit.max(1))
            .min(max_limit);
        Self {
            page,
            skip: (page - 1).saturating_mul(limit),
            limit,
        }
    }
}

fn parse_positive(raw: &str) -> Option<usize> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
}

/// A fully composed list query for one content kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub kind: String,
    pub search: Option<TitleMatch>,
    pub filters: Vec<FieldFilter>,
    pub sort: SortSpec,
    pub window: Window,
}

impl ListQuery {
    /// Unfiltered, newest-first query over one kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            search: None,
            filters: Vec::new(),
            sort: SortSpec::default(),
            window: Window::default(),
        }
    }

    /// Conjunction of the kind, the keyword match and every field filter.
    pub fn matches(&self, doc: &ContentDocument) -> bool {
        doc.kind == self.kind
            && self.search.as_ref().map(|s| s.matches(doc)).unwrap_or(true)
            && self.filters.iter().all(|f| f.matches(doc))
    }
}

fn as_number(v: &JsonValue) -> Option<f64> {
    match v {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn type_rank(v: &JsonValue) -> u8 {
    match v {
        JsonValue::Null => 0,
        JsonValue::Bool(_) => 1,
        JsonValue::Number(_) => 2,
        JsonValue::String(_) => 3,
        JsonValue::Array(_) => 4,
        JsonValue::Object(_) => 5,
    }
}

fn compare_json(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (JsonValue::Bool(x), JsonValue::Bool(y)) => x.cmp(y),
        (JsonValue::String(x), JsonValue::String(y)) => {
            match (parse_timestamp(x), parse_timestamp(y)) {
                (Some(tx), Some(ty)) => tx.cmp(&ty),
                _ => x.cmp(y),
            }
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewDocument;
    use chrono::TimeZone;
    use serde_json::json;

    fn doc(seq: u64, title: &str, attrs: JsonValue) -> ContentDocument {
        ContentDocument::new_with_seq(
            NewDocument {
                kind: "posts".into(),
                title: title.into(),
                content: String::new(),
                created_at: Some(Utc.timestamp_opt(1_700_000_000 + seq as i64, 0).unwrap()),
                attributes: serde_json::from_value(attrs).unwrap(),
                ..Default::default()
            },
            seq,
        )
    }

    #[test]
    fn operator_tokens_are_a_closed_set() {
        assert_eq!("gt".parse::<FilterOp>().unwrap(), FilterOp::Gt);
        assert_eq!("gte".parse::<FilterOp>().unwrap(), FilterOp::Gte);
        assert_eq!("lt".parse::<FilterOp>().unwrap(), FilterOp::Lt);
        assert_eq!("lte".parse::<FilterOp>().unwrap(), FilterOp::Lte);
        for bad in ["eq", "ne", "GTE", "regex", ""] {
            assert!(matches!(
                bad.parse::<FilterOp>(),
                Err(FolioError::Invalid(_))
            ));
        }
    }

    #[test]
    fn filter_keys_parse_into_field_and_operator() {
        let f = FieldFilter::parse("price[gte]", "100").unwrap();
        assert_eq!(f.field, "price");
        assert_eq!(f.op, FilterOp::Gte);
        assert_eq!(f.operand, Operand::Number(100.0));

        let f = FieldFilter::parse("category", "tech").unwrap();
        assert_eq!(f.op, FilterOp::Eq);
        assert_eq!(f.operand, Operand::Text("tech".into()));

        for bad in ["price[in]", "price[gte", "[gt]", "price[gt]x", "price[[gt]]", "a]"] {
            assert!(FieldFilter::parse(bad, "1").is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn numeric_bounds_compare_numerically() {
        let cheap = doc(1, "a", json!({"price": 50}));
        let mid = doc(2, "b", json!({"price": 150}));
        let dear = doc(3, "c", json!({"price": 600}));
        let as_text = doc(4, "d", json!({"price": "90"}));
        let gte = FieldFilter::parse("price[gte]", "100").unwrap();
        let lte = FieldFilter::parse("price[lte]", "500").unwrap();
        let both = |d: &ContentDocument| gte.matches(d) && lte.matches(d);
        assert!(!both(&cheap));
        assert!(both(&mid));
        assert!(!both(&dear));
        // "90" would sort after "100" as text
        assert!(!gte.matches(&as_text));
        assert!(FieldFilter::parse("price[gte]", "100").unwrap().matches(&mid));
        assert!(FieldFilter::parse("price[gt]", "150").map(|f| !f.matches(&mid)).unwrap());
        assert!(FieldFilter::parse("price[lt]", "150").map(|f| !f.matches(&mid)).unwrap());
        assert!(FieldFilter::parse("price", "150").unwrap().matches(&mid));
    }

    #[test]
    fn equality_handles_text_bools_and_arrays() {
        let d = doc(1, "a", json!({"category": "tech", "featured": true, "tags": ["rust", "db"]}));
        assert!(FieldFilter::parse("category", "tech").unwrap().matches(&d));
        assert!(!FieldFilter::parse("category", "Tech").unwrap().matches(&d));
        assert!(FieldFilter::parse("featured", "true").unwrap().matches(&d));
        assert!(!FieldFilter::parse("featured", "false").unwrap().matches(&d));
        assert!(FieldFilter::parse("tags", "db").unwrap().matches(&d));
        assert!(!FieldFilter::parse("missing", "x").unwrap().matches(&d));
        assert!(!FieldFilter::parse("category[gt]", "5").unwrap().matches(&d));
    }

    #[test]
    fn equality_on_stored_text_is_not_numeric() {
        let d = doc(1, "a", json!({"version": "1.1", "sku": "7", "code": "007"}));
        assert!(!FieldFilter::parse("version", "1.10").unwrap().matches(&d));
        assert!(FieldFilter::parse("version", "1.1").unwrap().matches(&d));
        assert!(!FieldFilter::parse("sku", "007").unwrap().matches(&d));
        assert!(!FieldFilter::parse("sku", "7.0e0").unwrap().matches(&d));
        assert!(FieldFilter::parse("code", "007").unwrap().matches(&d));
        // stored numbers still compare numerically
        let n = doc(2, "b", json!({"price": 7}));
        assert!(FieldFilter::parse("price", "7.0").unwrap().matches(&n));
        // range bounds still coerce numeric text
        assert!(FieldFilter::parse("sku[gte]", "5").unwrap().matches(&d));
    }

    #[test]
    fn timestamps_compare_chronologically() {
        let d = doc(5, "a", json!({}));
        let after = FieldFilter::parse("createdAt[gt]", "2023-11-14T22:13:00+00:00").unwrap();
        let before = FieldFilter::parse("createdAt[lt]", "2023-11-14T22:13:00Z").unwrap();
        assert!(after.matches(&d));
        assert!(!before.matches(&d));
    }

    #[test]
    fn keyword_is_escaped_and_case_insensitive() {
        let launch = doc(1, "Product Launch Event", json!({}));
        let report = doc(2, "Quarterly Report", json!({}));
        let weird = doc(3, "C++ (beta) release?", json!({}));
        let m = TitleMatch::new("title", "LAUNCH").unwrap();
        assert!(m.matches(&launch));
        assert!(!m.matches(&report));
        assert!(TitleMatch::new("title", "c++ (beta").unwrap().matches(&weird));
        assert!(!TitleMatch::new("title", ".*").unwrap().matches(&launch));
    }

    #[test]
    fn sort_parses_direction_and_defaults() {
        assert_eq!(SortSpec::parse(None), SortSpec::latest_first());
        assert_eq!(SortSpec::parse(Some(" , ")), SortSpec::latest_first());
        let s = SortSpec::parse(Some("-price,title"));
        assert_eq!(
            s.0,
            vec![
                SortKey { field: "price".into(), direction: Direction::Desc },
                SortKey { field: "title".into(), direction: Direction::Asc },
            ]
        );
    }

    #[test]
    fn equal_keys_fall_back_to_insertion_order() {
        let a = doc(1, "a", json!({"rank": 1}));
        let b = doc(2, "b", json!({"rank": 1}));
        let desc = SortSpec::parse(Some("-rank"));
        let asc = SortSpec::parse(Some("rank"));
        assert_eq!(desc.compare(&a, &b), Ordering::Greater);
        assert_eq!(asc.compare(&a, &b), Ordering::Less);
        assert_eq!(SortSpec::latest_first().compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn window_arithmetic_and_fallbacks() {
        let w = Window::from_params(Some("3"), Some("20"), 20, 100);
        assert_eq!((w.page, w.skip, w.limit), (3, 40, 20));
        for bad in ["0", "-2", "abc", "1.5", ""] {
            let w = Window::from_params(Some(bad), Some(bad), 20, 100);
            assert_eq!((w.page, w.skip, w.limit), (1, 0, 20), "input {bad:?}");
        }
        let w = Window::from_params(None, Some("5000"), 20, 100);
        assert_eq!(w.limit, 100);
        for p in 1..50usize {
            for l in 1..30usize {
                let w = Window::from_params(Some(&p.to_string()), Some(&l.to_string()), 20, 100);
                assert_eq!(w.skip, (p - 1) * l);
                assert!(w.limit > 0);
            }
        }
    }
}
