use std::fmt::Write;

use crate::chart::{ChartKind, ChartSpec, Dataset};
use crate::grade;
use crate::referral::{self, ReferralAnalysis, STATUS_COMPLETED, STATUS_IN_PROGRESS, STATUS_PENDING};
use crate::report::{self, card, html_escape, list_items, stat, TabSection};

const STATUS_COLORS: [&str; 5] = ["#ef4444", "#f59e0b", "#3b82f6", "#10b981", "#8b5cf6"];
const TREND_COLOR: &str = "#8b5cf6";
const TREND_FILL: &str = "rgba(139, 92, 246, 0.1)";
const NO_TREND: &str = "داده‌ای برای نمایش روند روزانه وجود ندارد";
const DEFAULT_SUMMARY: &str =
    "تحلیل با موفقیت انجام شد. برای دیدن جزئیات بیشتر به تب‌های دیگر مراجعه کنید.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferralTab {
    Overview,
    Status,
    Subjects,
    Units,
    Customers,
    Insights,
}

impl ReferralTab {
    pub const ALL: [ReferralTab; 6] = [
        ReferralTab::Overview,
        ReferralTab::Status,
        ReferralTab::Subjects,
        ReferralTab::Units,
        ReferralTab::Customers,
        ReferralTab::Insights,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ReferralTab::Overview => "overview",
            ReferralTab::Status => "status",
            ReferralTab::Subjects => "subjects",
            ReferralTab::Units => "units",
            ReferralTab::Customers => "customers",
            ReferralTab::Insights => "insights",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReferralTab::Overview => "نمای کلی",
            ReferralTab::Status => "وضعیت‌ها",
            ReferralTab::Subjects => "موضوعات",
            ReferralTab::Units => "واحدها",
            ReferralTab::Customers => "مشتریان",
            ReferralTab::Insights => "بینش‌ها",
        }
    }

    pub fn charts(self, analysis: &ReferralAnalysis) -> Vec<ChartSpec> {
        if self != ReferralTab::Overview {
            return Vec::new();
        }
        let mut charts = Vec::new();
        let distribution = &analysis.status.distribution;
        if !distribution.is_empty() {
            let (labels, data): (Vec<String>, Vec<f64>) = distribution
                .iter()
                .map(|(label, count)| (label.clone(), *count as f64))
                .unzip();
            charts.push(
                ChartSpec::new("status-pie-chart", ChartKind::Doughnut, labels)
                    .dataset(Dataset::new("وضعیت", data).colors(STATUS_COLORS)),
            );
        }
        let daily = &analysis.status.daily_counts;
        if !daily.is_empty() {
            let (labels, data): (Vec<String>, Vec<f64>) = daily
                .iter()
                .map(|(day, count)| (day.clone(), *count as f64))
                .unzip();
            charts.push(
                ChartSpec::new("daily-trend-chart", ChartKind::Line, labels).dataset(
                    Dataset::new("تعداد ارجاع", data)
                        .colors([TREND_FILL])
                        .border(TREND_COLOR)
                        .filled(),
                ),
            );
        }
        charts
    }

    pub fn body(self, analysis: &ReferralAnalysis) -> String {
        match self {
            ReferralTab::Overview => overview(analysis),
            ReferralTab::Status => status(analysis),
            ReferralTab::Subjects => subjects(analysis),
            ReferralTab::Units => units(analysis),
            ReferralTab::Customers => customers(analysis),
            ReferralTab::Insights => insights(analysis),
        }
    }

    pub fn section(self, analysis: &ReferralAnalysis) -> TabSection {
        TabSection {
            id: self.id().to_string(),
            title: self.title().to_string(),
            body: self.body(analysis),
            charts: self.charts(analysis),
        }
    }
}

pub fn render_referral_report(analysis: &ReferralAnalysis) -> String {
    let sections: Vec<TabSection> = ReferralTab::ALL
        .iter()
        .map(|tab| tab.section(analysis))
        .collect();
    let title = match analysis.meta.file_name.as_deref() {
        Some(name) => format!("تحلیل ارجاعات: {name}"),
        None => "تحلیل ارجاعات".to_string(),
    };
    report::document(&title, &sections)
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|text| !text.is_empty()).unwrap_or("—")
}

fn pill_row(label: &str, pill: &str) -> String {
    format!(
        "<div class=\"flex justify-between items-center\"><span class=\"font-semibold\">{}</span><span class=\"pill\">{}</span></div>",
        html_escape(label),
        html_escape(pill)
    )
}

fn rows_or_empty(rows: String) -> String {
    if rows.is_empty() {
        report::empty_state(report::EMPTY_LIST)
    } else {
        rows
    }
}

fn overview(analysis: &ReferralAnalysis) -> String {
    let status = &analysis.status;
    let bottleneck = status.bottleneck.as_ref();
    let mut output = String::from("<div class=\"grid md:grid-cols-4 gap-6 mb-6\">");
    output.push_str(&stat(
        STATUS_PENDING,
        &format!(
            "{} ({})",
            status.count_of(STATUS_PENDING),
            grade::percent_label(status.percent_pending)
        ),
        "text-purple-600",
    ));
    output.push_str(&stat(
        "در حال پیگیری",
        &status.count_of(STATUS_IN_PROGRESS).to_string(),
        "text-blue-600",
    ));
    output.push_str(&stat(
        "اتمام یافته",
        &format!(
            "{} ({})",
            status.count_of(STATUS_COMPLETED),
            grade::percent_label(status.percent_completed)
        ),
        "text-green-600",
    ));
    output.push_str(&stat(
        "گلوگاه فعال",
        &format!(
            "{} ({})",
            bottleneck.map(|unit| unit.count).unwrap_or(0),
            or_dash(bottleneck.map(|unit| unit.unit.as_str()))
        ),
        "text-orange-600",
    ));
    output.push_str("</div>");

    let summary_text = analysis
        .insights
        .summary
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(DEFAULT_SUMMARY);
    let mut summary = format!("<p>{}</p>", html_escape(summary_text));
    if !analysis.insights.recommendations.is_empty() {
        let _ = write!(
            summary,
            "<h4>توصیه‌های عملی:</h4>{}",
            list_items(&analysis.insights.recommendations)
        );
    }
    output.push_str(&card("خلاصه هوشمند", &summary));

    let pie = if status.distribution.is_empty() {
        report::empty_state(report::EMPTY_LIST)
    } else {
        report::canvas("status-pie-chart")
    };
    output.push_str(&card("توزیع وضعیت‌ها", &pie));
    let trend = if status.daily_counts.is_empty() {
        report::empty_state(NO_TREND)
    } else {
        report::canvas("daily-trend-chart")
    };
    output.push_str(&card("روند روزانه", &trend));
    output
}

fn status(analysis: &ReferralAnalysis) -> String {
    let status = &analysis.status;
    let mut bars = String::new();
    for bar in referral::status_bars(&status.distribution) {
        let _ = write!(
            bars,
            "<div class=\"status-bar\">{}<div class=\"bar\"><div class=\"bg-purple-600 h-3 rounded-full\" style=\"width: {:.1}%\"></div></div><div class=\"text-sm\">{:.1}%</div></div>",
            pill_row(&bar.label, &bar.count.to_string()),
            bar.percent,
            bar.percent
        );
    }
    let mut output = card("جزئیات وضعیت‌ها", &rows_or_empty(bars));

    let bottleneck = status.bottleneck.as_ref();
    let receiver = status.busiest_receiver.as_ref();
    let details = [
        pill_row(
            "میانگین زمان در بررسی نشده",
            &format!("{} روز", report::fmt_num(status.avg_days_pending)),
        ),
        pill_row(
            "واحد با بیشترین کار مانده",
            &format!(
                "{} ({} کار بررسی نشده)",
                or_dash(bottleneck.map(|unit| unit.unit.as_str())),
                bottleneck.map(|unit| unit.count).unwrap_or(0)
            ),
        ),
        pill_row(
            "گیرنده با بیشترین کار در حال پیگیری",
            &format!(
                "{} ({} کار)",
                or_dash(receiver.map(|unit| unit.unit.as_str())),
                receiver.map(|unit| unit.count).unwrap_or(0)
            ),
        ),
    ]
    .concat();
    output.push_str(&card("تحلیل گلوگاه‌ها", &details));
    output
}

fn subjects(analysis: &ReferralAnalysis) -> String {
    let subjects = &analysis.subjects;
    let mut output = card(
        "موضوعات پرتکرار",
        &pill_row(
            or_dash(subjects.most_frequent.as_deref()),
            &format!("{} بار", subjects.frequency),
        ),
    );
    let times: String = subjects
        .response_days
        .iter()
        .map(|(subject, days)| pill_row(subject, &format!("{} روز", report::fmt_num(*days))))
        .collect();
    output.push_str(&card("میانگین زمان پاسخگویی", &rows_or_empty(times)));
    let pending: String = subjects
        .pending
        .iter()
        .map(|(subject, count)| pill_row(subject, &format!("{count} مانده")))
        .collect();
    output.push_str(&card("موضوعات با کار مانده", &rows_or_empty(pending)));
    output
}

fn units(analysis: &ReferralAnalysis) -> String {
    let units = &analysis.units;
    let senders: String = units
        .top_senders
        .iter()
        .map(|unit| pill_row(&unit.unit, &format!("{} ارجاع", unit.count)))
        .collect();
    let receivers: String = units
        .top_receivers
        .iter()
        .map(|unit| pill_row(&unit.unit, &format!("{} ارجاع", unit.count)))
        .collect();
    let pairs: String = units
        .common_pairs
        .iter()
        .map(|pair| pill_row(&format!("{} ← {}", pair.from, pair.to), &format!("{} بار", pair.count)))
        .collect();
    let mut output = card("پرکارترین فرستنده‌ها", &rows_or_empty(senders));
    output.push_str(&card("پرکارترین گیرنده‌ها", &rows_or_empty(receivers)));
    output.push_str(&card("الگوهای همکاری", &rows_or_empty(pairs)));
    output
}

fn customers(analysis: &ReferralAnalysis) -> String {
    let institutions = &analysis.institutions;
    let mut rows = String::new();
    for institution in &institutions.top {
        let _ = write!(
            rows,
            "<div class=\"institution\">{}<div class=\"text-sm text-gray-600\">اشتراک: {}</div></div>",
            pill_row(&institution.name, &format!("{} ارجاع", institution.count)),
            html_escape(or_dash(institution.subscription.as_deref()))
        );
    }
    let mut output = card("مشتریان فعال", &rows_or_empty(rows));
    let correlation = institutions.subscription_correlation;
    output.push_str(&card(
        "تحلیل اشتراک",
        &format!(
            "<div class=\"text-5xl font-bold text-indigo-600\">{}</div><div>همبستگی اشتراک و تعداد ارجاع</div><div class=\"text-sm text-gray-500\">{}</div>",
            report::fmt_num(correlation),
            grade::correlation_label(correlation)
        ),
    ));
    output
}

fn insights(analysis: &ReferralAnalysis) -> String {
    let insights = &analysis.insights;
    let patterns: String = insights
        .recurring_patterns
        .iter()
        .map(|pattern| {
            format!(
                "<li><span class=\"pill\">{}</span> {}</li>",
                html_escape(&pattern.frequency),
                html_escape(&pattern.pattern)
            )
        })
        .collect();
    let patterns = if patterns.is_empty() {
        report::empty_state(report::EMPTY_LIST)
    } else {
        format!("<ul>{patterns}</ul>")
    };
    let mut output = card("بینش‌های کلیدی", &patterns);
    output.push_str(&card("عوامل موفقیت", &list_items(&insights.completion_factors)));
    let collaborations: String = insights
        .collaborating_units
        .iter()
        .map(|collaboration| {
            pill_row(
                &collaboration.units.join(" ← "),
                &format!("{:.0}%", collaboration.success_rate * 100.0),
            )
        })
        .collect();
    output.push_str(&card("واحدهای همکار", &rows_or_empty(collaborations)));
    output.push_str(&card(
        "تأثیر توضیحات",
        &pill_row(
            "آیا توضیحات کامل‌تر باعث اتمام سریع‌تر می‌شود؟",
            if insights.description_impact { "بله" } else { "خیر" },
        ),
    ));
    output
}
