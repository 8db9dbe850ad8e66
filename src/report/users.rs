use std::fmt::Write;

use crate::chart::{ChartKind, ChartSpec, Dataset};
use crate::grade;
use crate::models::CallAnalysis;
use crate::report::{self, card, html_escape, stat, TabSection};
use crate::users::{self, Roster, RosterSource, TeamOverview, UserPerformance};

const HIGHLIGHT: &str = "#1e3a5f";
const MUTED: &str = "#cbd5e1";
const NO_USERS: &str = "کاربری برای نمایش وجود ندارد";

/// The share doughnut splits the reported call total, matching `share_pct`.
pub fn user_charts(
    roster: &Roster,
    overview: &TeamOverview,
    performance: &UserPerformance,
) -> Vec<ChartSpec> {
    let others = overview.total_calls.saturating_sub(performance.calls);
    let share = ChartSpec::new(
        format!("user-{}-share-chart", performance.rank),
        ChartKind::Doughnut,
        vec![performance.name.clone(), "سایر کارشناسان".to_string()],
    )
    .dataset(
        Dataset::new("سهم تماس", vec![performance.calls as f64, others as f64])
            .colors([HIGHLIGHT, MUTED])
            .border("#fff"),
    );

    let ranked = roster.ranked();
    let colors: Vec<&str> = ranked
        .iter()
        .map(|user| if user.name == performance.name { HIGHLIGHT } else { MUTED })
        .collect();
    let compare = ChartSpec::new(
        format!("user-{}-compare-chart", performance.rank),
        ChartKind::Bar,
        ranked.iter().map(|user| user.name.clone()).collect(),
    )
    .dataset(
        Dataset::new(
            "تعداد تماس",
            ranked.iter().map(|user| user.call_count as f64).collect(),
        )
        .colors(colors),
    );
    vec![share, compare]
}

fn overview_cards(overview: &TeamOverview) -> String {
    let mut output = String::from("<div class=\"grid md:grid-cols-4 gap-6 mb-6\">");
    output.push_str(&stat("کارشناس فعال", &overview.active_users.to_string(), "text-primary"));
    output.push_str(&stat("کل تماس‌ها", &overview.total_calls.to_string(), "text-primary"));
    output.push_str(&stat("تماس موفق", &overview.successful_calls.to_string(), "text-green-600"));
    output.push_str(&stat(
        "نرخ موفقیت",
        &grade::percent_label(overview.success_rate),
        "text-yellow-600",
    ));
    output.push_str("</div>");
    output
}

fn bullet_list(items: &[&str]) -> String {
    let mut output = String::from("<ul>");
    for item in items {
        let _ = write!(output, "<li>{}</li>", html_escape(item));
    }
    output.push_str("</ul>");
    output
}

fn user_body(roster: &Roster, performance: &UserPerformance) -> String {
    let mut output = String::new();
    let _ = write!(
        output,
        "<div class=\"user-header\"><h2>{}</h2><span class=\"{}\">{}</span><p>{}</p></div>",
        html_escape(&performance.name),
        performance.status.badge_class(),
        performance.status.label(),
        html_escape(&performance.note)
    );

    let calls = if roster.counts_unknown && performance.calls == 0 {
        "نامشخص".to_string()
    } else {
        performance.calls.to_string()
    };
    let metrics = [
        stat("تعداد تماس", &calls, "text-primary"),
        stat("سهم از کل", &format!("{:.1}%", performance.share_pct), "text-primary"),
        stat("میانگین تیم", &format!("{:.1}", performance.team_average), "text-gray-700"),
        stat("رتبه", &performance.rank_label(), "text-primary"),
        stat("بیشترین تیم", &performance.team_max.to_string(), "text-green-600"),
        stat("کمترین تیم", &performance.team_min.to_string(), "text-red-600"),
        stat("میانگین روزانه", &performance.daily_average.to_string(), "text-primary"),
    ]
    .concat();
    output.push_str(&card("شاخص‌های عملکرد", &metrics));

    let charts = [
        report::canvas(&format!("user-{}-share-chart", performance.rank)),
        report::canvas(&format!("user-{}-compare-chart", performance.rank)),
    ]
    .concat();
    output.push_str(&card("مقایسه با تیم", &charts));
    output.push_str(&card("نقاط قوت", &bullet_list(&performance.strengths)));
    output.push_str(&card("پیشنهادهای بهبود", &bullet_list(&performance.suggestions)));

    let mut training = String::new();
    for item in &performance.training {
        let _ = write!(
            training,
            "<div class=\"training\"><i class=\"{}\"></i><h4>{}</h4><p>{}</p></div>",
            item.icon,
            html_escape(item.title),
            html_escape(item.description)
        );
    }
    output.push_str(&card("دوره‌های آموزشی پیشنهادی", &training));
    output
}

/// Team overview plus one tab per user. `selected` opens first; the busiest user otherwise.
pub fn render_users_report(analysis: &CallAnalysis, roster: &Roster, selected: Option<&str>) -> String {
    let overview = users::team_overview(analysis, roster);
    let header = overview_cards(&overview);

    if roster.source == RosterSource::InsufficientData || roster.is_empty() {
        let section = TabSection {
            id: "users".to_string(),
            title: "کاربران".to_string(),
            body: report::empty_state(NO_USERS),
            charts: Vec::new(),
        };
        return report::document_with_header("تحلیل کاربران", &header, &[section]);
    }

    let mut sections: Vec<TabSection> = roster
        .ranked()
        .into_iter()
        .filter_map(|user| users::evaluate_user(roster, &overview, &user.name))
        .map(|performance| TabSection {
            id: format!("user-{}", performance.rank),
            title: format!("{} ({} تماس)", performance.name, performance.calls),
            body: user_body(roster, &performance),
            charts: user_charts(roster, &overview, &performance),
        })
        .collect();

    if let Some(name) = selected {
        let position = roster.rank_of(name).and_then(|rank| {
            let id = format!("user-{rank}");
            sections.iter().position(|section| section.id == id)
        });
        match position {
            Some(position) => sections.rotate_left(position),
            None => log::warn!("user {name} is not in the roster"),
        }
    }
    report::document_with_header("تحلیل کاربران", &header, &sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActiveUser;

    fn sample_analysis() -> CallAnalysis {
        let mut analysis = CallAnalysis::default();
        analysis.statistics.total_calls = 100;
        analysis.statistics.successful_calls = 70;
        analysis.statistics.active_users = ["مریم", "رضا", "نیما"]
            .iter()
            .zip([20, 50, 30])
            .map(|(name, calls)| ActiveUser {
                name: name.to_string(),
                call_count: calls,
                note: None,
            })
            .collect();
        analysis
    }

    #[test]
    fn comparison_chart_highlights_selected_user() {
        let analysis = sample_analysis();
        let roster = users::extract_roster(&analysis);
        let overview = users::team_overview(&analysis, &roster);
        let performance = users::evaluate_user(&roster, &overview, "نیما").expect("known user");
        let charts = user_charts(&roster, &overview, &performance);
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].datasets[0].data, vec![30.0, 70.0]);
        assert_eq!(charts[1].labels, vec!["رضا", "نیما", "مریم"]);
        assert_eq!(charts[1].datasets[0].background_color, vec![MUTED, HIGHLIGHT, MUTED]);
    }

    #[test]
    fn share_chart_uses_reported_call_total() {
        let mut analysis = sample_analysis();
        analysis.statistics.total_calls = 200;
        analysis.statistics.active_users.truncate(2);
        for user in &mut analysis.statistics.active_users {
            user.call_count = 50;
        }
        let roster = users::extract_roster(&analysis);
        let overview = users::team_overview(&analysis, &roster);
        let performance = users::evaluate_user(&roster, &overview, "مریم").expect("known user");
        assert_eq!(performance.share_pct, 25.0);
        let charts = user_charts(&roster, &overview, &performance);
        assert_eq!(charts[0].datasets[0].data, vec![50.0, 150.0]);
    }

    #[test]
    fn selected_user_tab_opens_first() {
        let analysis = sample_analysis();
        let roster = users::extract_roster(&analysis);
        let html = render_users_report(&analysis, &roster, Some("مریم"));
        let first_tab = html.find("data-show=\"user-3\"").expect("tab for مریم");
        let other_tab = html.find("data-show=\"user-1\"").expect("tab for رضا");
        assert!(first_tab < other_tab);
        assert!(html.contains("70.0%"));
        assert!(html.contains("3 از 3"));
    }

    #[test]
    fn empty_roster_renders_message() {
        let analysis = CallAnalysis::default();
        let roster = users::extract_roster(&analysis);
        let html = render_users_report(&analysis, &roster, None);
        assert!(html.contains(NO_USERS));
    }
}
