//! Aggregate counts computed by scanning the whole ledger.
//!
//! Nothing is cached; every call re-reads the ledger from the first row.
//! Columns are located by header name. A row whose field count differs from
//! the header is skipped with a warning and the scan continues.
//!
//! # Quirks
//!
//! - Rows whose `category` is neither `国内` nor `国际` still register their
//!   date but add nothing to the per-date or per-category totals.
//! - Rows whose `importance` is not exactly `高`, `中` or `低` are left out of
//!   `by_importance` but still count towards the category totals.

use csv::ReaderBuilder;
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::models::{Category, DateCount, Statistics};
use crate::storage::ledger::LedgerStore;

/// Scan the ledger and compute [`Statistics`].
///
/// A ledger that does not exist yet produces all-zero statistics.
#[instrument(level = "info", skip_all, fields(path = %ledger.path().display()))]
pub async fn compute_statistics(ledger: &LedgerStore) -> Result<Statistics> {
    match ledger.read_bytes().await? {
        Some(bytes) => tally(&bytes),
        None => {
            info!("Ledger not found; returning empty statistics");
            Ok(Statistics::default())
        }
    }
}

/// Compute statistics from raw ledger bytes (header row first).
pub fn tally(bytes: &[u8]) -> Result<Statistics> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let (date_col, category_col, importance_col) =
        (column("date"), column("category"), column("importance"));

    let mut stats = Statistics::default();
    let mut by_date: BTreeMap<String, DateCount> = BTreeMap::new();
    let mut skipped = 0usize;
    let mut unranked = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                skipped += 1;
                warn!(error = %e, "Skipping unreadable ledger row");
                continue;
            }
        };
        if record.len() != headers.len() {
            skipped += 1;
            warn!(
                line = record.position().map(|p| p.line()),
                fields = record.len(),
                expected = headers.len(),
                "Skipping malformed ledger row"
            );
            continue;
        }

        let cell = |col: Option<usize>| col.and_then(|i| record.get(i)).unwrap_or("");
        let date = cell(date_col);
        let counts = by_date.entry(date.to_string()).or_insert_with(|| DateCount {
            date: date.to_string(),
            ..Default::default()
        });

        match Category::from_label(cell(category_col)) {
            Some(Category::Domestic) => {
                counts.domestic += 1;
                stats.total_domestic += 1;
            }
            Some(Category::International) => {
                counts.international += 1;
                stats.total_international += 1;
            }
            None => {}
        }

        if !stats.by_importance.record(cell(importance_col)) {
            unranked += 1;
        }
    }

    stats.total_days = by_date.len();
    stats.by_date = by_date.into_values().rev().collect();

    info!(
        days = stats.total_days,
        domestic = stats.total_domestic,
        international = stats.total_international,
        ranked = stats.by_importance.total(),
        unranked,
        skipped,
        "Computed ledger statistics"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImportanceCounts, LEDGER_COLUMNS};

    const HEADER: &str =
        "date,category,index,title,summary,importance,impact_score,reason,source,url,tags,created_at";

    fn line(date: &str, category: &str, importance: &str) -> String {
        format!("{date},{category},1,T,S,{importance},8,R,src,https://example.com,\"AI,测试\",{date} 16:00:00")
    }

    fn ledger(lines: &[String]) -> Vec<u8> {
        let mut out = format!("{HEADER}\r\n");
        for l in lines {
            out.push_str(l);
            out.push_str("\r\n");
        }
        out.into_bytes()
    }

    #[test]
    fn test_header_matches_ledger_columns() {
        assert_eq!(HEADER, LEDGER_COLUMNS.join(","));
    }

    #[test]
    fn test_counts_by_date_and_category() {
        let bytes = ledger(&[
            line("2024-12-08", "国内", "高"),
            line("2024-12-09", "国内", "中"),
            line("2024-12-09", "国际", "低"),
            line("2024-12-09", "国际", "高"),
        ]);
        let stats = tally(&bytes).unwrap();

        assert_eq!(stats.total_days, 2);
        assert_eq!(stats.total_domestic, 2);
        assert_eq!(stats.total_international, 2);
        assert_eq!(
            stats.by_date,
            vec![
                DateCount { date: "2024-12-09".into(), domestic: 1, international: 2 },
                DateCount { date: "2024-12-08".into(), domestic: 1, international: 0 },
            ]
        );
        assert_eq!(stats.by_importance, ImportanceCounts { high: 2, medium: 1, low: 1 });
    }

    #[test]
    fn test_unknown_category_registers_date_only() {
        let bytes = ledger(&[line("2024-12-09", "其他", "高")]);
        let stats = tally(&bytes).unwrap();

        assert_eq!(stats.total_days, 1);
        assert_eq!(stats.total_domestic + stats.total_international, 0);
        assert_eq!(stats.by_date[0].domestic + stats.by_date[0].international, 0);
        assert_eq!(stats.by_importance.high, 1);
    }

    #[test]
    fn test_unknown_importance_excluded_from_buckets() {
        let bytes = ledger(&[
            line("2024-12-09", "国内", "high"),
            line("2024-12-09", "国内", ""),
            line("2024-12-09", "国内", "高"),
        ]);
        let stats = tally(&bytes).unwrap();

        assert_eq!(stats.total_domestic, 3);
        assert_eq!(stats.by_importance.total(), 1);
        assert!(stats.by_importance.total() < stats.total_domestic);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let bytes = ledger(&[
            line("2024-12-09", "国内", "高"),
            "2024-12-10,国内,1,short".to_string(),
            line("2024-12-09", "国际", "中"),
        ]);
        let stats = tally(&bytes).unwrap();

        assert_eq!(stats.total_days, 1);
        assert_eq!(stats.total_domestic, 1);
        assert_eq!(stats.total_international, 1);
    }

    #[test]
    fn test_header_only_ledger() {
        let stats = tally(&ledger(&[])).unwrap();
        assert_eq!(stats, Statistics::default());
    }

    #[test]
    fn test_empty_file() {
        let stats = tally(b"").unwrap();
        assert_eq!(stats, Statistics::default());
    }

    #[tokio::test]
    async fn test_missing_ledger_is_all_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(tmp.path().join("news.csv"));
        let stats = compute_statistics(&store).await.unwrap();

        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.total_domestic, 0);
        assert_eq!(stats.total_international, 0);
        assert!(stats.by_date.is_empty());
        assert_eq!(stats.by_importance.total(), 0);
    }
}
