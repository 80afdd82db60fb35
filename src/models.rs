//! Data models for daily digests and the records derived from them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Digest`]: One day's categorized news submission, stored verbatim as a snapshot
//! - [`LedgerRow`]: A flattened news item as written to the CSV ledger
//! - [`Statistics`] and [`Index`]: Derived summary documents for the front end
//!
//! A digest keeps the submitted JSON object as-is (key order, `null`s and
//! unknown keys included). Ledger cells are read from it leniently: any
//! scalar is rendered as text and `null` or a missing key becomes an empty
//! cell.

use crate::utils::today_iso;
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Ledger label for domestic news.
pub const DOMESTIC_LABEL: &str = "国内";
/// Ledger label for international news.
pub const INTERNATIONAL_LABEL: &str = "国际";

/// Header of the CSV ledger. [`LedgerRow`] serializes its fields in this order.
pub const LEDGER_COLUMNS: [&str; 12] = [
    "date",
    "category",
    "index",
    "title",
    "summary",
    "importance",
    "impact_score",
    "reason",
    "source",
    "url",
    "tags",
    "created_at",
];

/// One day's news submission.
///
/// Serializes back to exactly the object it was parsed from. The storage
/// date is taken from the `date` key, or today's local date when that key is
/// missing or `null`; the fallback is never written into the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    date: String,
    document: Map<String, Value>,
}

impl Digest {
    pub fn new(document: Map<String, Value>) -> Self {
        let date = match document.get("date") {
            None | Some(Value::Null) => today_iso(),
            Some(value) => scalar_cell(value),
        };
        Digest { date, document }
    }

    /// The date used for the snapshot file name and ledger rows.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// The submitted document.
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Domestic items in submitted order. Missing or non-array is empty.
    pub fn domestic(&self) -> &[Value] {
        self.items("domestic")
    }

    /// International items in submitted order. Missing or non-array is empty.
    pub fn international(&self) -> &[Value] {
        self.items("international")
    }

    /// The free-form overview of the day, when it is a string.
    pub fn summary(&self) -> Option<&str> {
        self.document.get("summary").and_then(Value::as_str)
    }

    fn items(&self, key: &str) -> &[Value] {
        self.document
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Flatten domestic then international items into ledger rows that all
    /// share the given `created_at` timestamp.
    pub fn ledger_rows(&self, created_at: &str) -> Vec<LedgerRow> {
        let domestic = self
            .domestic()
            .iter()
            .map(|item| LedgerRow::from_item(&self.date, Category::Domestic, item, created_at));
        let international = self.international().iter().map(|item| {
            LedgerRow::from_item(&self.date, Category::International, item, created_at)
        });
        domestic.chain(international).collect()
    }

    /// Total number of news items across both categories.
    pub fn item_count(&self) -> usize {
        self.domestic().len() + self.international().len()
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Digest::new)
    }
}

/// Which half of a digest an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Domestic,
    International,
}

impl Category {
    /// The literal written to the ledger's `category` column.
    pub fn label(self) -> &'static str {
        match self {
            Category::Domestic => DOMESTIC_LABEL,
            Category::International => INTERNATIONAL_LABEL,
        }
    }

    /// Exact match against the two known labels. Anything else is `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            DOMESTIC_LABEL => Some(Category::Domestic),
            INTERNATIONAL_LABEL => Some(Category::International),
            _ => None,
        }
    }
}

/// A news item flattened into one ledger line.
///
/// Tags are joined with `,` and are not escaped, so a tag that itself
/// contains a comma cannot be recovered from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub date: String,
    pub category: String,
    pub index: String,
    pub title: String,
    pub summary: String,
    pub importance: String,
    pub impact_score: String,
    pub reason: String,
    pub source: String,
    pub url: String,
    pub tags: String,
    pub created_at: String,
}

impl LedgerRow {
    /// Build a row from one item of a digest. Non-object items produce a row
    /// of empty cells.
    pub fn from_item(date: &str, category: Category, item: &Value, created_at: &str) -> Self {
        let cell = |key: &str| item.get(key).map(scalar_cell).unwrap_or_default();
        let tags = match item.get("tags") {
            Some(Value::Array(tags)) => tags.iter().map(scalar_cell).join(","),
            Some(other) => scalar_cell(other),
            None => String::new(),
        };
        LedgerRow {
            date: date.to_string(),
            category: category.label().to_string(),
            index: cell("index"),
            title: cell("title"),
            summary: cell("summary"),
            importance: cell("importance"),
            impact_score: cell("impact_score"),
            reason: cell("reason"),
            source: cell("source"),
            url: cell("url"),
            tags,
            created_at: created_at.to_string(),
        }
    }
}

/// Render a JSON value the way it should appear in a CSV cell.
fn scalar_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Per-date item counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DateCount {
    pub date: String,
    pub domestic: usize,
    pub international: usize,
}

/// Counts for the three known importance labels.
///
/// Rows with any other importance value are not counted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImportanceCounts {
    #[serde(rename = "高")]
    pub high: usize,
    #[serde(rename = "中")]
    pub medium: usize,
    #[serde(rename = "低")]
    pub low: usize,
}

impl ImportanceCounts {
    /// Increment the bucket matching `label` exactly. Returns `false` when
    /// the label is not one of the three known values.
    pub fn record(&mut self, label: &str) -> bool {
        let bucket = match label {
            "高" => &mut self.high,
            "中" => &mut self.medium,
            "低" => &mut self.low,
            _ => return false,
        };
        *bucket += 1;
        true
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Aggregate counts computed from the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Statistics {
    /// Distinct dates seen in the ledger.
    pub total_days: usize,
    pub total_domestic: usize,
    pub total_international: usize,
    /// One entry per ledger date, newest first.
    pub by_date: Vec<DateCount>,
    pub by_importance: ImportanceCounts,
}

/// The summary document written to `index.json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Index {
    pub last_updated: String,
    /// Snapshot dates, newest first.
    pub dates: Vec<String>,
    pub statistics: Statistics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn digest(value: Value) -> Digest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_digest_without_date_defaults_to_today() {
        let digest = digest(json!({"domestic": [], "international": []}));
        assert_eq!(digest.date(), today_iso());
        assert!(digest.document().get("date").is_none());
        assert!(!serde_json::to_string(&digest).unwrap().contains("date"));
    }

    #[test]
    fn test_digest_serializes_submitted_document_unchanged() {
        let raw = r#"{"summary":"s","date":"2024-12-09","domestic":[{"title":null,"index":1,"importance":"高"}],"international":[],"zeta":1,"alpha":2}"#;
        let digest: Digest = serde_json::from_str(raw).unwrap();

        assert_eq!(serde_json::to_string(&digest).unwrap(), raw);
        assert_eq!(digest.date(), "2024-12-09");
        assert_eq!(digest.summary(), Some("s"));
    }

    #[test]
    fn test_digest_rejects_non_object() {
        assert!(serde_json::from_str::<Digest>("[1, 2]").is_err());
    }

    #[test]
    fn test_ledger_rows_order_and_labels() {
        let digest = digest(json!({
            "date": "2024-12-09",
            "domestic": [{"index": 1, "title": "T", "importance": "高", "tags": ["AI", "测试"]}],
            "international": [{"index": 1, "title": "World"}]
        }));

        let rows = digest.ledger_rows("2024-12-09 16:00:00");
        assert_eq!(digest.item_count(), 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "国内");
        assert_eq!(rows[0].tags, "AI,测试");
        assert_eq!(rows[0].index, "1");
        assert_eq!(rows[1].category, "国际");
        assert_eq!(rows[1].tags, "");
        assert!(rows.iter().all(|r| r.created_at == "2024-12-09 16:00:00"));
    }

    #[test]
    fn test_lenient_cells_accept_any_scalar() {
        let item = json!({
            "index": "1",
            "title": null,
            "importance": 3,
            "impact_score": 8.5,
            "tags": ["AI", 7]
        });
        let row = LedgerRow::from_item("2024-12-09", Category::Domestic, &item, "now");
        assert_eq!(row.index, "1");
        assert_eq!(row.title, "");
        assert_eq!(row.importance, "3");
        assert_eq!(row.impact_score, "8.5");
        assert_eq!(row.tags, "AI,7");
        assert_eq!(row.url, "");
    }

    #[test]
    fn test_non_object_item_gives_empty_row() {
        let row = LedgerRow::from_item("2024-12-09", Category::International, &json!("oops"), "now");
        assert_eq!(row.category, "国际");
        assert_eq!(row.title, "");
        assert_eq!(row.tags, "");
    }

    #[test]
    fn test_missing_category_lists_are_empty() {
        let digest = digest(json!({"date": "2024-12-09", "domestic": "n/a"}));
        assert!(digest.domestic().is_empty());
        assert!(digest.international().is_empty());
        assert!(digest.ledger_rows("now").is_empty());
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::from_label("国内"), Some(Category::Domestic));
        assert_eq!(Category::from_label("国际"), Some(Category::International));
        assert_eq!(Category::from_label("domestic"), None);
        assert_eq!(Category::International.label(), INTERNATIONAL_LABEL);
    }

    #[test]
    fn test_importance_counts_ignore_unknown_labels() {
        let mut counts = ImportanceCounts::default();
        assert!(counts.record("高"));
        assert!(counts.record("低"));
        assert!(!counts.record("high"));
        assert!(!counts.record(""));
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_statistics_serialize_importance_keys() {
        let stats = Statistics::default();
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains(r#""by_importance":{"高":0,"中":0,"低":0}"#));
        assert!(json.contains(r#""by_date":[]"#));
    }
}
