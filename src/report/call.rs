use std::fmt::Write;

use crate::chart::{ChartKind, ChartSpec, Dataset};
use crate::grade::{self, ScoreBadge};
use crate::models::{BestEntry, CallAnalysis, ScoreDimension};
use crate::report::{self, card, html_escape, list_items, row, stat, TabSection};

const PRIMARY: &str = "rgba(102, 126, 234, 1)";
const PRIMARY_FILL: &str = "rgba(102, 126, 234, 0.2)";
const PRIMARY_BAR: &str = "rgba(102, 126, 234, 0.8)";
const GREEN: &str = "rgba(16, 185, 129, 1)";
const GREEN_FILL: &str = "rgba(16, 185, 129, 0.2)";
const PURPLE_BAR: &str = "rgba(147, 51, 234, 0.8)";
const DISC_COLORS: [&str; 4] = ["#ef4444", "#f59e0b", "#10b981", "#3b82f6"];
const DISC_LABELS: [&str; 4] = ["D - قاطعیت", "I - تعامل", "S - ثبات", "C - دقت"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTab {
    Overview,
    Scores,
    Analysis,
    Disc,
    Lists,
    Stats,
    Best,
}

impl CallTab {
    pub const ALL: [CallTab; 7] = [
        CallTab::Overview,
        CallTab::Scores,
        CallTab::Analysis,
        CallTab::Disc,
        CallTab::Lists,
        CallTab::Stats,
        CallTab::Best,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CallTab::Overview => "overview",
            CallTab::Scores => "scores",
            CallTab::Analysis => "analysis",
            CallTab::Disc => "disc",
            CallTab::Lists => "lists",
            CallTab::Stats => "stats",
            CallTab::Best => "best",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CallTab::Overview => "نمای کلی",
            CallTab::Scores => "امتیازها",
            CallTab::Analysis => "تحلیل",
            CallTab::Disc => "DISC",
            CallTab::Lists => "لیست‌ها",
            CallTab::Stats => "آمار",
            CallTab::Best => "برترین‌ها",
        }
    }

    pub fn charts(self, analysis: &CallAnalysis) -> Vec<ChartSpec> {
        match self {
            CallTab::Overview => vec![score_radar("overview-radar-chart", analysis, PRIMARY, PRIMARY_FILL)],
            CallTab::Scores => vec![
                score_radar("scores-radar-chart", analysis, GREEN, GREEN_FILL),
                score_bar(analysis),
            ],
            CallTab::Disc => vec![disc_doughnut(analysis)],
            CallTab::Stats if !analysis.statistics.call_types.is_empty() => {
                vec![call_types_bar(analysis)]
            }
            _ => Vec::new(),
        }
    }

    pub fn body(self, analysis: &CallAnalysis) -> String {
        match self {
            CallTab::Overview => overview(analysis),
            CallTab::Scores => scores(analysis),
            CallTab::Analysis => analysis_tab(analysis),
            CallTab::Disc => disc(analysis),
            CallTab::Lists => lists(analysis),
            CallTab::Stats => stats(analysis),
            CallTab::Best => best(analysis),
        }
    }

    pub fn section(self, analysis: &CallAnalysis) -> TabSection {
        TabSection {
            id: self.id().to_string(),
            title: self.title().to_string(),
            body: self.body(analysis),
            charts: self.charts(analysis),
        }
    }
}

pub fn render_call_report(analysis: &CallAnalysis) -> String {
    let sections: Vec<TabSection> = CallTab::ALL
        .iter()
        .map(|tab| tab.section(analysis))
        .collect();
    let title = match analysis.meta.file_name.as_deref() {
        Some(name) => format!("تحلیل تماس: {name}"),
        None => "تحلیل تماس".to_string(),
    };
    report::document(&title, &sections)
}

fn dimension_labels() -> Vec<String> {
    ScoreDimension::ALL.iter().map(|d| d.label()).collect()
}

fn score_radar(canvas: &str, analysis: &CallAnalysis, border: &str, fill: &str) -> ChartSpec {
    ChartSpec::new(canvas, ChartKind::Radar, dimension_labels())
        .dataset(
            Dataset::new("امتیازات", analysis.scores.dimensions.to_vec())
                .colors([fill])
                .border(border)
                .filled(),
        )
        .max(10.0)
}

fn score_bar(analysis: &CallAnalysis) -> ChartSpec {
    let mut labels = vec!["امتیاز کل".to_string()];
    labels.extend(dimension_labels());
    let mut data = vec![analysis.scores.overall];
    data.extend(analysis.scores.dimensions);
    ChartSpec::new("scores-bar-chart", ChartKind::Bar, labels)
        .dataset(Dataset::new("امتیاز", data).colors([PRIMARY_BAR]).border(PRIMARY))
        .max(10.0)
}

fn disc_doughnut(analysis: &CallAnalysis) -> ChartSpec {
    ChartSpec::new(
        "disc-doughnut-chart",
        ChartKind::Doughnut,
        DISC_LABELS.iter().map(|label| label.to_string()).collect(),
    )
    .dataset(
        Dataset::new("DISC", analysis.disc.axes().to_vec())
            .colors(DISC_COLORS)
            .border("#fff"),
    )
}

fn call_types_bar(analysis: &CallAnalysis) -> ChartSpec {
    let (labels, data): (Vec<String>, Vec<f64>) = analysis
        .statistics
        .call_types
        .iter()
        .map(|(label, count)| (label.clone(), *count as f64))
        .unzip();
    ChartSpec::new("call-types-chart", ChartKind::Bar, labels)
        .dataset(Dataset::new("تعداد", data).colors([PURPLE_BAR]))
}

pub fn score_badge(score: f64) -> String {
    let badge = ScoreBadge::classify(score);
    format!(
        "<span class=\"badge {}\">{}</span>",
        badge.badge_class(),
        badge.label()
    )
}

fn score_bar_row(label: &str, score: f64) -> String {
    let badge = ScoreBadge::classify(score);
    let width = (score * 10.0).clamp(0.0, 100.0);
    format!(
        "<div class=\"mb-3\"><div class=\"flex justify-between\"><span>{}</span><span class=\"{}\">{}/10</span></div><div class=\"bar\"><div class=\"h-2 rounded-full {}\" style=\"width: {width}%\"></div></div></div>",
        html_escape(label),
        badge.text_class(),
        report::fmt_num(score),
        badge.bar_class()
    )
}

fn overview(analysis: &CallAnalysis) -> String {
    let text = &analysis.text;
    let stats = &analysis.statistics;
    let mut output = String::new();

    output.push_str("<div class=\"grid md:grid-cols-4 gap-6 mb-6\">");
    output.push_str(&stat(
        "امتیاز کلی",
        &format!("{:.1}", analysis.scores.overall),
        "gradient-text",
    ));
    output.push_str(&score_badge(analysis.scores.overall));
    output.push_str(&stat("کل تماس‌ها", &stats.total_calls.to_string(), "text-blue-600"));
    output.push_str(&stat(
        "تماس موفق",
        &format!(
            "{} ({})",
            stats.successful_calls,
            grade::percent_label(stats.success_rate())
        ),
        "text-green-600",
    ));
    output.push_str(&stat(
        "کیفیت لید",
        &format!("{}%", report::fmt_num(analysis.indicators.lead_quality_pct)),
        "text-purple-600",
    ));
    output.push_str("</div>");

    let seller = [
        row("نام فروشنده", &text.seller_name),
        row("کد فروشنده", &text.seller_code),
        row("سطح فروشنده", &text.seller_level),
        row("تیپ DISC", &analysis.disc.dominant_type),
    ]
    .concat();
    output.push_str(&card("اطلاعات فروشنده", &seller));

    let customer = [
        row("نام مشتری", &text.customer_name),
        row("محصول", &text.product),
        row("سطح آگاهی مشتری", &text.customer_awareness),
        row("ترجیح کانال", &text.channel_preference),
    ]
    .concat();
    output.push_str(&card("اطلاعات مشتری", &customer));

    let call = [
        row("مدت تماس", &text.call_duration),
        row("جهت تماس", &text.call_direction),
        row("مرحله تماس", &text.call_stage),
        row("گرمی تماس", &text.call_warmth),
        row("ماهیت تماس", &text.call_nature),
    ]
    .concat();
    output.push_str(&card("مشخصات تماس", &call));

    let mut bars = String::new();
    for (dimension, score) in analysis.scores.iter() {
        bars.push_str(&score_bar_row(&dimension.label(), score));
    }
    output.push_str(&card("امتیازهای کلیدی", &bars));
    output.push_str(&report::canvas("overview-radar-chart"));
    output.push_str(&card(
        "خلاصه",
        &format!("<p>{}</p>", html_escape(&text.summary)),
    ));
    output
}

fn scores(analysis: &CallAnalysis) -> String {
    let mut output = String::from("<div class=\"grid md:grid-cols-5 gap-4 mb-6\">");
    let overall = std::iter::once(("امتیاز کل".to_string(), analysis.scores.overall));
    let dimensions = analysis
        .scores
        .iter()
        .map(|(dimension, score)| (dimension.label(), score));
    for (label, score) in overall.chain(dimensions) {
        let badge = ScoreBadge::classify(score);
        let _ = write!(
            output,
            "<div class=\"score-card text-center\"><div class=\"text-3xl font-bold {}\">{}</div><div class=\"text-sm\">{}</div>{}</div>",
            badge.text_class(),
            report::fmt_num(score),
            html_escape(&label),
            score_badge(score)
        );
    }
    output.push_str("</div>");
    output.push_str(&card("نمودار راداری امتیازها", &report::canvas("scores-radar-chart")));
    output.push_str(&card("مقایسه امتیازها", &report::canvas("scores-bar-chart")));

    let indicators = &analysis.indicators;
    let metrics = [
        ("تعداد سوالات باز", report::fmt_num(indicators.open_questions)),
        ("تعداد اعتراض", report::fmt_num(indicators.objections)),
        ("پاسخ به اعتراض", format!("{}%", report::fmt_num(indicators.objection_success_pct))),
        ("تلاش بستن", report::fmt_num(indicators.closing_attempts)),
        ("احساس مشتری", format!("{}/10", report::fmt_num(indicators.customer_sentiment))),
        ("آمادگی بستن", format!("{}%", report::fmt_num(indicators.closing_readiness_pct))),
        ("چگالی فنی فروشنده", format!("{}%", report::fmt_num(indicators.seller_tech_density_pct))),
        ("چگالی فنی مشتری", format!("{}%", report::fmt_num(indicators.customer_tech_density_pct))),
        ("بله‌های پله‌ای", report::fmt_num(indicators.stepped_yes_count)),
    ];
    let cards: String = metrics
        .iter()
        .map(|(label, value)| stat(label, value, "text-indigo-600"))
        .collect();
    output.push_str(&card("شاخص‌های عملکرد", &cards));

    output.push_str(&reason_card("دلایل افزایش امتیاز", analysis, true));
    output.push_str(&reason_card("دلایل کاهش امتیاز", analysis, false));
    output
}

fn reason_card(title: &str, analysis: &CallAnalysis, increase: bool) -> String {
    let mut body = String::new();
    for dimension in ScoreDimension::ALL {
        let reasons = if increase {
            analysis.reasons.increase_for(dimension)
        } else {
            analysis.reasons.decrease_for(dimension)
        };
        let _ = write!(
            body,
            "<div class=\"mb-3\"><div class=\"font-semibold\">{}</div>{}</div>",
            html_escape(&dimension.label()),
            list_items(reasons)
        );
    }
    card(title, &body)
}

fn sensitivity(label: &str, value: f64, color: &str) -> String {
    let width = value.clamp(0.0, 100.0);
    format!(
        "<div class=\"text-center\"><div class=\"text-3xl font-bold text-{color}-600\">{}%</div><div class=\"bar\"><div class=\"bg-{color}-600 h-3 rounded-full\" style=\"width: {width}%\"></div></div><div class=\"text-sm\">{}</div></div>",
        report::fmt_num(value),
        html_escape(label)
    )
}

fn analysis_tab(analysis: &CallAnalysis) -> String {
    let text = &analysis.text;
    let indicators = &analysis.indicators;
    let paragraph = |value: &str| format!("<p class=\"whitespace-pre-line\">{}</p>", html_escape(value));

    let mut output = String::new();
    output.push_str(&card("تحلیل شخصیت مشتری", &paragraph(&text.personality_analysis)));
    output.push_str(&card(
        "ارزیابی عملکرد فردی فروشنده",
        &paragraph(&text.performance_evaluation),
    ));
    let talk = [
        row("نسبت صحبت مشتری به فروشنده", &text.customer_to_seller_talk),
        row("نسبت صحبت فروشنده به مشتری", &text.seller_to_customer_talk),
    ]
    .concat();
    output.push_str(&card("نسبت زمان صحبت", &talk));
    let sensitivities = [
        sensitivity("حساسیت قیمت", indicators.price_sensitivity_pct, "red"),
        sensitivity("حساسیت ریسک", indicators.risk_sensitivity_pct, "orange"),
        sensitivity("حساسیت زمان", indicators.time_sensitivity_pct, "yellow"),
    ]
    .concat();
    output.push_str(&card("حساسیت‌های مشتری", &sensitivities));
    output.push_str(&card("تشخیص آمادگی", &paragraph(&text.readiness_diagnosis)));
    output.push_str(&card("اقدام بعدی", &paragraph(&text.next_action)));
    output
}

fn disc(analysis: &CallAnalysis) -> String {
    let profile = &analysis.disc;
    let mut bars = String::new();
    for (label, value) in DISC_LABELS.iter().zip(profile.axes()) {
        bars.push_str(&score_bar_row(label, value));
    }
    let mut output = card("امتیازات DISC", &bars);
    output.push_str(&card("نمودار DISC", &report::canvas("disc-doughnut-chart")));
    output.push_str(&card(
        "تیپ شخصیتی غالب",
        &format!(
            "<div class=\"text-6xl font-bold gradient-text\">{}</div>",
            html_escape(&profile.dominant_type)
        ),
    ));
    output.push_str(&card("شواهد", &list_items(&profile.evidence)));
    output.push_str(&card(
        "راهنمای تعامل",
        &format!("<p>{}</p>", html_escape(&profile.guidance)),
    ));
    output
}

fn keyword_chips(words: &[String], class: &str) -> String {
    if words.is_empty() {
        return format!("<span class=\"text-gray-500\">{}</span>", report::EMPTY_LIST);
    }
    words
        .iter()
        .map(|word| format!("<span class=\"chip {class}\">{}</span>", html_escape(word)))
        .collect()
}

fn lists(analysis: &CallAnalysis) -> String {
    let lists = &analysis.lists;
    let mut output = String::new();
    for (title, items) in [
        ("نقاط قوت", &lists.strengths),
        ("نقاط ضعف", &lists.weaknesses),
        ("اعتراضات", &lists.objections),
        ("تکنیک‌ها", &lists.techniques),
        ("ریسک‌ها", &lists.risks),
        ("پارامترهای رعایت نشده", &lists.missed_parameters),
        ("اشتباهات رایج", &lists.common_mistakes),
    ] {
        output.push_str(&card(title, &list_items(items)));
    }
    let keywords = format!(
        "<div><h4>کلمات مثبت</h4>{}</div><div><h4>کلمات منفی</h4>{}</div>",
        keyword_chips(&lists.positive_keywords, "bg-green-100 text-green-800"),
        keyword_chips(&lists.negative_keywords, "bg-red-100 text-red-800")
    );
    output.push_str(&card("کلمات کلیدی", &keywords));
    output
}

fn stats(analysis: &CallAnalysis) -> String {
    let stats = &analysis.statistics;
    let mut output = String::from("<div class=\"grid md:grid-cols-4 gap-6 mb-6\">");
    output.push_str(&stat("کل تماس‌ها", &stats.total_calls.to_string(), "text-blue-600"));
    output.push_str(&stat("تماس موفق", &stats.successful_calls.to_string(), "text-green-600"));
    output.push_str(&stat("بی‌پاسخ", &stats.unanswered_calls.to_string(), "text-red-600"));
    output.push_str(&stat("ارجاعی", &stats.referred_calls.to_string(), "text-orange-600"));
    output.push_str("</div>");
    output.push_str(&stat(
        "نرخ موفقیت",
        &grade::percent_label(stats.success_rate()),
        "text-green-600",
    ));

    let mut users = String::new();
    for user in &stats.active_users {
        let _ = write!(
            users,
            "<div class=\"user-row\"><span class=\"font-semibold\">{}</span> <span class=\"pill\">{}</span>{}</div>",
            html_escape(&user.name),
            user.call_count,
            user.note
                .as_deref()
                .map(|note| format!("<p class=\"text-sm\">{}</p>", html_escape(note)))
                .unwrap_or_default()
        );
    }
    if users.is_empty() {
        users = report::empty_state(report::EMPTY_LIST);
    }
    output.push_str(&card("کاربران فعال", &users));

    let mut customers = String::new();
    for customer in &stats.top_customers {
        let _ = write!(
            customers,
            "<div class=\"customer-row\"><span class=\"font-semibold\">{}</span> <span class=\"pill\">{}</span>{}</div>",
            html_escape(&customer.name),
            customer.contact_count,
            customer
                .interaction_quality
                .as_deref()
                .map(|quality| format!("<p class=\"text-sm\">کیفیت: {}</p>", html_escape(quality)))
                .unwrap_or_default()
        );
    }
    if customers.is_empty() {
        customers = report::empty_state(report::EMPTY_LIST);
    }
    output.push_str(&card("مشتریان پرتماس", &customers));

    let chart = if stats.call_types.is_empty() {
        report::empty_state("داده‌ای برای انواع تماس وجود ندارد")
    } else {
        report::canvas("call-types-chart")
    };
    output.push_str(&card("انواع تماس", &chart));
    output
}

fn best_card(title: &str, entry: &BestEntry) -> String {
    let reason = if entry.reason.trim().is_empty() {
        "دلیلی ثبت نشده"
    } else {
        entry.reason.as_str()
    };
    card(
        title,
        &format!(
            "<div class=\"text-3xl font-bold gradient-text\">{}</div><h4>دلیل انتخاب:</h4><p>{}</p>",
            html_escape(&entry.name),
            html_escape(reason)
        ),
    )
}

fn best(analysis: &CallAnalysis) -> String {
    let mut output = best_card("بهترین فروشنده", &analysis.best.seller);
    output.push_str(&best_card("بهترین مشتری", &analysis.best.customer));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    fn sample_analysis() -> CallAnalysis {
        normalize(json!({
            "فیلدهای_عددی": {"امتیاز_کل": 8.5, "امتیاز_شنوندگی": 6},
            "فیلدهای_متنی": {"نام_فروشنده": "<علی>", "خلاصه": "تماس خوب"},
            "لیست_ها": {"نقاط_قوت": ["صبر"]},
            "آمار": {"تعداد_کل_تماس_ها": 100, "تماس_های_موفق": 70, "انواع_تماس": {"ورودی": 60, "خروجی": 40}}
        }))
        .expect("object payload")
    }

    #[test]
    fn chart_tabs_declare_their_canvases() {
        let analysis = sample_analysis();
        let ids = |tab: CallTab| -> Vec<String> {
            tab.charts(&analysis)
                .into_iter()
                .map(|chart| chart.canvas_id)
                .collect()
        };
        assert_eq!(ids(CallTab::Overview), vec!["overview-radar-chart"]);
        assert_eq!(ids(CallTab::Scores), vec!["scores-radar-chart", "scores-bar-chart"]);
        assert_eq!(ids(CallTab::Disc), vec!["disc-doughnut-chart"]);
        assert_eq!(ids(CallTab::Stats), vec!["call-types-chart"]);
        assert!(ids(CallTab::Best).is_empty());
        for tab in CallTab::ALL {
            let body = tab.body(&analysis);
            for chart in tab.charts(&analysis) {
                assert!(body.contains(&chart.canvas_id), "{} lacks its canvas", tab.id());
            }
        }
    }

    #[test]
    fn stats_tab_without_call_types_shows_empty_state() {
        let analysis = CallAnalysis::default();
        assert!(CallTab::Stats.charts(&analysis).is_empty());
        assert!(CallTab::Stats.body(&analysis).contains("داده‌ای برای انواع تماس وجود ندارد"));
    }

    #[test]
    fn report_escapes_and_shows_rates() {
        let html = render_call_report(&sample_analysis());
        assert!(html.contains("&lt;علی&gt;"));
        assert!(!html.contains("<علی>"));
        assert!(html.contains("70.0%"));
        assert!(html.contains("badge-high"));
        for tab in CallTab::ALL {
            assert!(html.contains(&format!("data-tab=\"{}\"", tab.id())));
        }
    }

    #[test]
    fn best_entries_fall_back_to_placeholder() {
        let html = CallTab::Best.body(&CallAnalysis::default());
        assert!(html.contains("—"));
        assert!(html.contains("تعیین نشده"));
    }
}
