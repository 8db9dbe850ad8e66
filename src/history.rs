use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::api::ApiError;
use crate::coerce;
use crate::state::{Action, ActionGuard};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("delete of record {0} is already in progress")]
    InFlight(i64),
    #[error(transparent)]
    Remote(#[from] ApiError),
}

/// Rows that can live in a [`HistoryBook`].
pub trait HistoryRow {
    fn id(&self) -> i64;
    fn delete_action(id: i64) -> Action;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub id: i64,
    pub file_name: Option<String>,
    pub analyzed_at: Option<NaiveDateTime>,
    pub score_total: f64,
    pub seller_name: Option<String>,
    pub customer_name: Option<String>,
    pub product: Option<String>,
    pub total_calls: u64,
    pub successful_calls: u64,
}

impl AnalysisSummary {
    pub fn from_value(value: &Value) -> Option<Self> {
        let row = value.as_object()?;
        Some(Self {
            id: row.get("id")?.as_i64()?,
            file_name: coerce::text_at(row, "file_name"),
            analyzed_at: coerce::timestamp_at(row, "analyzed_at")
                .or_else(|| coerce::timestamp_at(row, "created_at")),
            score_total: coerce::number_at(row, "score_total"),
            seller_name: coerce::text_at(row, "seller_name"),
            customer_name: coerce::text_at(row, "customer_name"),
            product: coerce::text_at(row, "product"),
            total_calls: coerce::count_at(row, "total_calls"),
            successful_calls: coerce::count_at(row, "successful_calls"),
        })
    }
}

impl HistoryRow for AnalysisSummary {
    fn id(&self) -> i64 {
        self.id
    }

    fn delete_action(id: i64) -> Action {
        Action::DeleteAnalysis(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferralHistoryEntry {
    pub id: i64,
    pub file_name: String,
    pub analyzed_at: Option<NaiveDateTime>,
    pub total_referrals: u64,
    pub completed_count: u64,
    pub pending_count: u64,
    pub completion_rate: f64,
    pub bottleneck_unit: Option<String>,
    pub health_score: Option<f64>,
    pub risk_count: u64,
}

impl ReferralHistoryEntry {
    pub fn from_value(value: &Value) -> Option<Self> {
        let row = value.as_object()?;
        Some(Self {
            id: row.get("id")?.as_i64()?,
            file_name: coerce::text_at(row, "file_name").unwrap_or_default(),
            analyzed_at: coerce::timestamp_at(row, "analyzed_at"),
            total_referrals: coerce::count_at(row, "total_referrals"),
            completed_count: coerce::count_at(row, "completed_count"),
            pending_count: coerce::count_at(row, "pending_count"),
            completion_rate: coerce::number_at(row, "completion_rate"),
            bottleneck_unit: coerce::text_at(row, "bottleneck_unit"),
            health_score: coerce::truthy(row, "health_score").map(coerce::number),
            risk_count: coerce::count_at(row, "risk_count"),
        })
    }
}

impl HistoryRow for ReferralHistoryEntry {
    fn id(&self) -> i64 {
        self.id
    }

    fn delete_action(id: i64) -> Action {
        Action::DeleteReferral(id)
    }
}

/// Parses a history listing, skipping rows without a numeric id.
pub fn parse_rows<T>(payload: &Value, parse: fn(&Value) -> Option<T>) -> Vec<T> {
    let rows = match payload {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(map) => map
            .get("history")
            .or_else(|| map.get("items"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };
    let parsed: Vec<T> = rows.iter().filter_map(parse).collect();
    if parsed.len() != rows.len() {
        log::debug!("skipped {} history rows without an id", rows.len() - parsed.len());
    }
    parsed
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferralOverall {
    pub analyses: usize,
    pub referrals: u64,
    pub completed: u64,
    pub pending: u64,
    pub top_bottleneck: Option<String>,
}

pub fn referral_overall(entries: &[ReferralHistoryEntry]) -> ReferralOverall {
    let bottlenecks = entries
        .iter()
        .filter_map(|entry| entry.bottleneck_unit.as_deref())
        .filter(|unit| !unit.is_empty());

    ReferralOverall {
        analyses: entries.len(),
        referrals: entries.iter().map(|entry| entry.total_referrals).sum(),
        completed: entries.iter().map(|entry| entry.completed_count).sum(),
        pending: entries.iter().map(|entry| entry.pending_count).sum(),
        top_bottleneck: most_frequent(bottlenecks),
    }
}

/// Most frequent item; ties go to the one seen first.
fn most_frequent<'a>(items: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, item) in items.enumerate() {
        counts.entry(item).or_insert((0, position)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(item, _)| item.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBand {
    High,
    Medium,
    Low,
}

impl RateBand {
    pub fn contains(self, rate: f64) -> bool {
        match self {
            RateBand::High => rate >= 70.0,
            RateBand::Medium => (50.0..70.0).contains(&rate),
            RateBand::Low => rate < 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BottleneckFilter {
    With,
    Without,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferralFilter {
    pub search: Option<String>,
    pub rate: Option<RateBand>,
    pub bottleneck: Option<BottleneckFilter>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReferralFilter {
    pub fn matches(&self, entry: &ReferralHistoryEntry) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            if !entry
                .file_name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(band) = self.rate {
            if !band.contains(entry.completion_rate) {
                return false;
            }
        }
        let has_bottleneck = entry
            .bottleneck_unit
            .as_deref()
            .is_some_and(|unit| !unit.is_empty());
        match self.bottleneck {
            Some(BottleneckFilter::With) if !has_bottleneck => return false,
            Some(BottleneckFilter::Without) if has_bottleneck => return false,
            _ => {}
        }
        // Rows without a timestamp are never excluded by the date range.
        if let Some(date) = entry.analyzed_at.map(|at| at.date()) {
            if self.from.is_some_and(|from| date < from) {
                return false;
            }
            if self.to.is_some_and(|to| date > to) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, entries: &'a [ReferralHistoryEntry]) -> Vec<&'a ReferralHistoryEntry> {
        entries.iter().filter(|entry| self.matches(entry)).collect()
    }
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub rows: &'a [T],
    pub number: usize,
    pub page_count: usize,
    pub total: usize,
    pub start: usize,
    pub end: usize,
}

impl<T> Page<'_, T> {
    pub fn label(&self) -> String {
        if self.total == 0 {
            "هیچ رکوردی یافت نشد".to_string()
        } else {
            format!("نمایش {} تا {} از {} رکورد", self.start, self.end, self.total)
        }
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.page_count
    }
}

/// Slices the 1-based `page` out of `rows`. Pages past the end come back empty.
pub fn paginate<T>(rows: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page = page.max(1);
    let total = rows.len();
    let begin = (page - 1).saturating_mul(page_size).min(total);
    let end = page.saturating_mul(page_size).min(total);
    Page {
        rows: &rows[begin..end],
        number: page,
        page_count: page_count(total, page_size),
        total,
        start: if begin < end { begin + 1 } else { 0 },
        end,
    }
}

/// A locally held history list with the current page.
#[derive(Debug, Clone)]
pub struct HistoryBook<T> {
    rows: Vec<T>,
    page: usize,
    page_size: usize,
}

impl<T: HistoryRow> HistoryBook<T> {
    pub fn new(rows: Vec<T>, page_size: usize) -> Self {
        Self {
            rows,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn current(&self) -> Page<'_, T> {
        paginate(&self.rows, self.page, self.page_size)
    }

    /// Moves to `page` when it exists; out-of-range requests are ignored.
    pub fn set_page(&mut self, page: usize) -> bool {
        let max = page_count(self.rows.len(), self.page_size);
        if page >= 1 && page <= max {
            self.page = page;
            true
        } else {
            false
        }
    }

    /// Deletes `id` remotely, then locally. A failed remote call leaves the rows untouched.
    pub async fn delete<F, Fut>(
        &mut self,
        guard: &ActionGuard,
        id: i64,
        remote: F,
    ) -> Result<(), DeleteError>
    where
        F: FnOnce(i64) -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        let _in_flight = guard
            .try_begin(T::delete_action(id))
            .ok_or(DeleteError::InFlight(id))?;

        if let Err(err) = remote(id).await {
            log::warn!("delete of record {id} failed: {err}");
            return Err(err.into());
        }

        self.rows.retain(|row| row.id() != id);
        let max = page_count(self.rows.len(), self.page_size).max(1);
        self.page = self.page.min(max);
        log::info!("deleted record {id}, {} rows remain", self.rows.len());
        Ok(())
    }
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("failed to write csv row")?;
    }
    writer.flush().context("failed to flush csv")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_entry(id: i64, rate: f64, bottleneck: Option<&str>, day: u32) -> ReferralHistoryEntry {
        ReferralHistoryEntry {
            id,
            file_name: format!("Referrals-{id}.xlsx"),
            analyzed_at: NaiveDate::from_ymd_opt(2025, 3, day)
                .and_then(|date| date.and_hms_opt(10, 0, 0)),
            total_referrals: 10,
            completed_count: 6,
            pending_count: 2,
            completion_rate: rate,
            bottleneck_unit: bottleneck.map(str::to_string),
            health_score: None,
            risk_count: 0,
        }
    }

    fn sample_book(count: i64) -> HistoryBook<ReferralHistoryEntry> {
        let rows = (1..=count)
            .map(|id| sample_entry(id, 60.0, None, 1))
            .collect();
        HistoryBook::new(rows, DEFAULT_PAGE_SIZE)
    }

    #[test]
    fn rows_parse_from_backend_json() {
        let payload = json!([
            {"id": 3, "file_name": "a.xlsx", "analyzed_at": "2025-03-01T08:30:00",
             "completion_rate": "64.5", "bottleneck_unit": "فنی", "health_score": 0, "risk_count": 2},
            {"file_name": "no-id.xlsx"}
        ]);
        let rows = parse_rows(&payload, ReferralHistoryEntry::from_value);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].completion_rate, 64.5);
        assert_eq!(rows[0].health_score, None);
        assert_eq!(rows[0].risk_count, 2);

        let calls = parse_rows(
            &json!({"history": [{"id": 1, "created_at": "2025-02-01 09:00:00", "score_total": 7.5}]}),
            AnalysisSummary::from_value,
        );
        assert_eq!(calls[0].score_total, 7.5);
        assert!(calls[0].analyzed_at.is_some());
    }

    #[test]
    fn overall_stats_pick_most_frequent_bottleneck() {
        let entries = vec![
            sample_entry(1, 80.0, Some("مالی"), 1),
            sample_entry(2, 40.0, Some("فنی"), 2),
            sample_entry(3, 55.0, Some("فنی"), 3),
            sample_entry(4, 55.0, None, 4),
        ];
        let overall = referral_overall(&entries);
        assert_eq!(overall.analyses, 4);
        assert_eq!(overall.referrals, 40);
        assert_eq!(overall.completed, 24);
        assert_eq!(overall.top_bottleneck.as_deref(), Some("فنی"));
        assert_eq!(referral_overall(&[]).top_bottleneck, None);
    }

    #[test]
    fn filters_combine_search_rate_bottleneck_and_dates() {
        let entries = vec![
            sample_entry(1, 80.0, Some("مالی"), 1),
            sample_entry(2, 40.0, None, 5),
            sample_entry(3, 55.0, Some("فنی"), 10),
        ];
        let high = ReferralFilter {
            rate: Some(RateBand::High),
            ..ReferralFilter::default()
        };
        assert_eq!(high.apply(&entries).len(), 1);

        let without = ReferralFilter {
            bottleneck: Some(BottleneckFilter::Without),
            ..ReferralFilter::default()
        };
        assert_eq!(without.apply(&entries)[0].id, 2);

        let ranged = ReferralFilter {
            from: NaiveDate::from_ymd_opt(2025, 3, 5),
            to: NaiveDate::from_ymd_opt(2025, 3, 10),
            ..ReferralFilter::default()
        };
        let ids: Vec<i64> = ranged.apply(&entries).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3]);

        let search = ReferralFilter {
            search: Some("referrals-3".to_string()),
            ..ReferralFilter::default()
        };
        assert_eq!(search.apply(&entries).len(), 1);
    }

    #[test]
    fn pagination_labels_ranges() {
        let rows: Vec<u32> = (1..=23).collect();
        let first = paginate(&rows, 1, 10);
        assert_eq!(first.label(), "نمایش 1 تا 10 از 23 رکورد");
        assert!(!first.has_previous());
        let last = paginate(&rows, 3, 10);
        assert_eq!(last.rows, &[21, 22, 23]);
        assert_eq!(last.label(), "نمایش 21 تا 23 از 23 رکورد");
        assert!(!last.has_next());
        let empty: Vec<u32> = Vec::new();
        assert_eq!(paginate(&empty, 1, 10).label(), "هیچ رکوردی یافت نشد");
    }

    #[test]
    fn huge_page_numbers_come_back_empty() {
        let rows: Vec<u32> = (1..=23).collect();
        let page = paginate(&rows, usize::MAX, 10);
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 23);
        assert!(!page.has_next());
        assert!(paginate(&rows, usize::MAX / 2, usize::MAX).rows.is_empty());
    }

    #[test]
    fn out_of_range_page_changes_are_ignored() {
        let mut book = sample_book(15);
        assert!(!book.set_page(0));
        assert!(!book.set_page(3));
        assert!(book.set_page(2));
        assert_eq!(book.page(), 2);
    }

    #[tokio::test]
    async fn failed_delete_leaves_rows_and_releases_guard() {
        let guard = ActionGuard::default();
        let mut book = sample_book(3);
        let result = book
            .delete(&guard, 2, |_| async {
                Err(ApiError::Backend("خطا در حذف رکورد".to_string()))
            })
            .await;
        assert!(matches!(result, Err(DeleteError::Remote(_))));
        assert_eq!(book.rows().len(), 3);
        assert!(!guard.is_busy(&Action::DeleteReferral(2)));

        book.delete(&guard, 2, |_| async { Ok(()) })
            .await
            .expect("second attempt succeeds");
        assert_eq!(book.rows().len(), 2);
    }

    #[tokio::test]
    async fn delete_is_refused_while_in_flight() {
        let guard = ActionGuard::default();
        let _held = guard.try_begin(Action::DeleteReferral(1));
        let mut book = sample_book(2);
        let result = book.delete(&guard, 1, |_| async { Ok(()) }).await;
        assert!(matches!(result, Err(DeleteError::InFlight(1))));
        assert_eq!(book.rows().len(), 2);
    }

    #[tokio::test]
    async fn delete_clamps_current_page() {
        let guard = ActionGuard::default();
        let mut book = sample_book(11);
        assert!(book.set_page(2));
        book.delete(&guard, 11, |_| async { Ok(()) })
            .await
            .expect("delete succeeds");
        assert_eq!(book.page(), 1);
        assert_eq!(book.current().rows.len(), 10);
    }

    #[test]
    fn csv_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.csv");
        let entries = vec![sample_entry(1, 80.0, Some("مالی"), 1)];
        write_csv(&path, &entries).expect("csv written");
        let text = std::fs::read_to_string(&path).expect("csv readable");
        let mut lines = text.lines();
        assert!(lines
            .next()
            .is_some_and(|header| header.starts_with("id,file_name,analyzed_at")));
        assert!(lines.next().is_some_and(|row| row.contains("مالی")));
    }
}
