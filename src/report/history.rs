use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::grade::{self, health_tier, RiskLevel, ScoreBadge, Tier};
use crate::history::{
    paginate, referral_overall, AnalysisSummary, Page, ReferralFilter, ReferralHistoryEntry,
};
use crate::report::{self, card, html_escape, stat, TabSection};

pub fn format_timestamp(at: Option<NaiveDateTime>) -> String {
    at.map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string())
}

/// Previous/next markers for a page, empty when there is only one page.
pub fn page_hint<T>(page: &Page<'_, T>) -> String {
    let mut hint = String::new();
    if page.has_previous() {
        hint.push_str(" « قبلی");
    }
    if page.has_next() {
        hint.push_str(" » بعدی");
    }
    hint
}

fn text_or_dash(value: Option<&str>) -> String {
    html_escape(value.filter(|text| !text.is_empty()).unwrap_or("—"))
}

pub fn call_history_table(rows: &[AnalysisSummary]) -> String {
    if rows.is_empty() {
        return report::empty_state("هیچ تحلیلی ثبت نشده است");
    }
    let mut output = String::from(
        "<table><thead><tr><th>#</th><th>فایل</th><th>تاریخ</th><th>فروشنده</th><th>مشتری</th><th>محصول</th><th>امتیاز</th><th>نرخ موفقیت</th></tr></thead><tbody>",
    );
    for row in rows {
        let badge = ScoreBadge::classify(row.score_total);
        let _ = write!(
            output,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><span class=\"px-3 py-1 rounded-full {}\">{}</span></td><td>{}</td></tr>",
            row.id,
            text_or_dash(row.file_name.as_deref()),
            format_timestamp(row.analyzed_at),
            text_or_dash(row.seller_name.as_deref()),
            text_or_dash(row.customer_name.as_deref()),
            text_or_dash(row.product.as_deref()),
            badge.pill_class(),
            report::fmt_num(row.score_total),
            grade::percent_label(grade::success_rate(row.successful_calls, row.total_calls))
        );
    }
    output.push_str("</tbody></table>");
    output
}

pub fn render_call_history(rows: &[AnalysisSummary]) -> String {
    let section = TabSection {
        id: "history".to_string(),
        title: "تاریخچه تحلیل‌ها".to_string(),
        body: call_history_table(rows),
        charts: Vec::new(),
    };
    report::document("تاریخچه تحلیل تماس‌ها", &[section])
}

fn referral_row(entry: &ReferralHistoryEntry) -> String {
    let rate_class = Tier::from_rate(entry.completion_rate).pill_class();
    let health_class = health_tier(entry.health_score)
        .map(Tier::pill_class)
        .unwrap_or(grade::NEUTRAL_PILL);
    let health = entry
        .health_score
        .map(report::fmt_num)
        .unwrap_or_else(|| "—".to_string());
    let risk = if entry.risk_count > 0 {
        format!(
            "<span class=\"px-3 py-1 {} text-white rounded-full\">{} ریسک</span>",
            RiskLevel::from_count(entry.risk_count).class(),
            entry.risk_count
        )
    } else {
        "—".to_string()
    };
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><span class=\"px-3 py-1 rounded-full {}\">{}</span></td><td>{}</td><td><span class=\"px-3 py-1 rounded-full {}\">{}</span></td><td>{}</td></tr>",
        entry.id,
        html_escape(&entry.file_name),
        format_timestamp(entry.analyzed_at),
        entry.total_referrals,
        entry.completed_count,
        entry.pending_count,
        rate_class,
        grade::percent_label(entry.completion_rate),
        text_or_dash(entry.bottleneck_unit.as_deref()),
        health_class,
        health,
        risk
    )
}

/// Overall stats over every entry, then the filtered rows of `page`.
pub fn render_referral_history(
    entries: &[ReferralHistoryEntry],
    filter: &ReferralFilter,
    page: usize,
    page_size: usize,
) -> String {
    let overall = referral_overall(entries);
    let mut body = String::from("<div class=\"grid md:grid-cols-5 gap-4 mb-6\">");
    body.push_str(&stat("کل تحلیل‌ها", &overall.analyses.to_string(), "text-purple-600"));
    body.push_str(&stat("کل ارجاعات", &overall.referrals.to_string(), "text-blue-600"));
    body.push_str(&stat("اتمام یافته", &overall.completed.to_string(), "text-green-600"));
    body.push_str(&stat("در انتظار", &overall.pending.to_string(), "text-yellow-600"));
    body.push_str(&stat(
        "گلوگاه پرتکرار",
        overall.top_bottleneck.as_deref().unwrap_or("—"),
        "text-red-600",
    ));
    body.push_str("</div>");

    let filtered: Vec<ReferralHistoryEntry> = filter.apply(entries).into_iter().cloned().collect();
    let current = paginate(&filtered, page, page_size);
    let mut table = String::from(
        "<table><thead><tr><th>#</th><th>فایل</th><th>تاریخ</th><th>کل</th><th>اتمام</th><th>مانده</th><th>نرخ اتمام</th><th>گلوگاه</th><th>سلامت</th><th>ریسک</th></tr></thead><tbody>",
    );
    for entry in current.rows {
        table.push_str(&referral_row(entry));
    }
    table.push_str("</tbody></table>");
    let _ = write!(
        table,
        "<div class=\"pagination\">{}{}</div>",
        html_escape(&current.label()),
        html_escape(&page_hint(&current))
    );
    body.push_str(&card("تاریخچه ارجاعات", &table));

    let section = TabSection {
        id: "referral-history".to_string(),
        title: "تاریخچه ارجاعات".to_string(),
        body,
        charts: Vec::new(),
    };
    report::document("تاریخچه تحلیل ارجاعات", &[section])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::RateBand;
    use chrono::NaiveDate;

    fn sample_entry(id: i64, rate: f64, health: Option<f64>, risks: u64) -> ReferralHistoryEntry {
        ReferralHistoryEntry {
            id,
            file_name: format!("file-{id}.xlsx"),
            analyzed_at: NaiveDate::from_ymd_opt(2025, 4, 2).and_then(|d| d.and_hms_opt(9, 5, 0)),
            total_referrals: 20,
            completed_count: 12,
            pending_count: 5,
            completion_rate: rate,
            bottleneck_unit: Some("مالی".to_string()),
            health_score: health,
            risk_count: risks,
        }
    }

    #[test]
    fn referral_rows_use_tier_and_risk_classes() {
        let high = referral_row(&sample_entry(1, 75.0, Some(65.0), 3));
        assert!(high.contains("bg-green-100 text-green-800"));
        assert!(high.contains("bg-yellow-100 text-yellow-800"));
        assert!(high.contains("bg-red-600"));
        assert!(high.contains("2025-04-02 09:05"));

        let neutral = referral_row(&sample_entry(2, 10.0, None, 0));
        assert!(neutral.contains(grade::NEUTRAL_PILL));
        assert!(neutral.contains("bg-red-100 text-red-800"));
        assert!(!neutral.contains("ریسک</span>"));
    }

    #[test]
    fn history_page_filters_and_paginates() {
        let entries: Vec<ReferralHistoryEntry> = (1..=12)
            .map(|id| sample_entry(id, if id % 2 == 0 { 80.0 } else { 40.0 }, None, 0))
            .collect();
        let filter = ReferralFilter {
            rate: Some(RateBand::High),
            ..ReferralFilter::default()
        };
        let html = render_referral_history(&entries, &filter, 1, 10);
        assert!(html.contains("نمایش 1 تا 6 از 6 رکورد"));
        assert!(!html.contains("بعدی"));
        assert!(html.contains(">12<"));
        assert!(!html.contains("file-1.xlsx"));
    }

    #[test]
    fn page_hint_marks_neighbours() {
        let rows: Vec<u32> = (1..=25).collect();
        assert_eq!(page_hint(&paginate(&rows, 1, 10)), " » بعدی");
        assert_eq!(page_hint(&paginate(&rows, 2, 10)), " « قبلی » بعدی");
        assert_eq!(page_hint(&paginate(&rows, 3, 10)), " « قبلی");
        assert_eq!(page_hint(&paginate(&rows[..5], 1, 10)), "");

        let entries: Vec<ReferralHistoryEntry> =
            (1..=12).map(|id| sample_entry(id, 80.0, None, 0)).collect();
        let html = render_referral_history(&entries, &ReferralFilter::default(), 2, 10);
        assert!(html.contains("نمایش 11 تا 12 از 12 رکورد « قبلی"));
    }

    #[test]
    fn call_history_table_colours_scores() {
        let rows = vec![AnalysisSummary {
            id: 4,
            file_name: Some("call.mp3".to_string()),
            analyzed_at: None,
            score_total: 8.2,
            seller_name: None,
            customer_name: None,
            product: None,
            total_calls: 10,
            successful_calls: 7,
        }];
        let table = call_history_table(&rows);
        assert!(table.contains(ScoreBadge::Excellent.pill_class()));
        assert!(table.contains("70.0%"));
        assert!(call_history_table(&[]).contains("هیچ تحلیلی"));
    }
}
