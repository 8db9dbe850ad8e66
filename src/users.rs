//! Active-user roster and the per-user performance breakdown.

use log::debug;
use serde::Serialize;

use crate::coerce;
use crate::grade::{self, PerformanceStatus};
use crate::models::{is_placeholder, ActiveUser, CallAnalysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RosterSource {
    Statistics,
    BestSeller,
    SellerNames,
    CallTypes,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Roster {
    pub source: RosterSource,
    pub users: Vec<ActiveUser>,
    /// Set when some users were listed without a known call count.
    pub counts_unknown: bool,
}

impl Roster {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&ActiveUser> {
        self.users.iter().find(|user| user.name == name)
    }

    pub fn total_calls(&self) -> u64 {
        self.users.iter().map(|user| user.call_count).sum()
    }

    pub fn max_calls(&self) -> u64 {
        self.users.iter().map(|user| user.call_count).max().unwrap_or(0)
    }

    pub fn min_calls(&self) -> u64 {
        self.users.iter().map(|user| user.call_count).min().unwrap_or(0)
    }

    /// Users by descending call count; ties keep roster order.
    pub fn ranked(&self) -> Vec<&ActiveUser> {
        let mut sorted: Vec<&ActiveUser> = self.users.iter().collect();
        sorted.sort_by(|a, b| b.call_count.cmp(&a.call_count));
        sorted
    }

    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.ranked()
            .iter()
            .position(|user| user.name == name)
            .map(|index| index + 1)
    }
}

pub fn extract_roster(analysis: &CallAnalysis) -> Roster {
    let stats = &analysis.statistics;

    let roster = if !stats.active_users.is_empty() {
        Roster {
            source: RosterSource::Statistics,
            users: stats.active_users.clone(),
            counts_unknown: false,
        }
    } else if !analysis.best.seller.is_placeholder() {
        let seller = &analysis.best.seller;
        Roster {
            source: RosterSource::BestSeller,
            users: vec![ActiveUser {
                name: seller.name.clone(),
                call_count: stats.successful_calls,
                note: Some(seller.reason.clone()),
            }],
            counts_unknown: stats.successful_calls == 0,
        }
    } else if !is_placeholder(&analysis.text.seller_name) {
        let mut counts_unknown = false;
        let users = coerce::split_names(&analysis.text.seller_name)
            .into_iter()
            .map(|name| {
                let known = stats
                    .call_types
                    .iter()
                    .find(|(label, _)| *label == name)
                    .map(|(_, count)| *count);
                counts_unknown |= known.is_none();
                ActiveUser {
                    name,
                    call_count: known.unwrap_or(0),
                    note: None,
                }
            })
            .collect();
        Roster {
            source: RosterSource::SellerNames,
            users,
            counts_unknown,
        }
    } else if !stats.call_types.is_empty() {
        Roster {
            source: RosterSource::CallTypes,
            users: stats
                .call_types
                .iter()
                .map(|(name, count)| ActiveUser {
                    name: name.clone(),
                    call_count: *count,
                    note: None,
                })
                .collect(),
            counts_unknown: false,
        }
    } else {
        Roster {
            source: RosterSource::InsufficientData,
            users: Vec::new(),
            counts_unknown: true,
        }
    };

    debug!(
        "active-user roster from {:?} with {} users",
        roster.source,
        roster.users.len()
    );
    roster
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamOverview {
    pub active_users: usize,
    pub total_calls: u64,
    pub successful_calls: u64,
    pub unanswered_calls: u64,
    pub success_rate: f64,
}

pub fn team_overview(analysis: &CallAnalysis, roster: &Roster) -> TeamOverview {
    let stats = &analysis.statistics;
    let total_calls = if stats.total_calls > 0 {
        stats.total_calls
    } else {
        roster.total_calls()
    };
    TeamOverview {
        active_users: roster.users.len(),
        total_calls,
        successful_calls: stats.successful_calls,
        unanswered_calls: stats.unanswered_calls,
        success_rate: grade::success_rate(stats.successful_calls, total_calls),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingItem {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPerformance {
    pub name: String,
    pub note: String,
    pub calls: u64,
    pub share_pct: f64,
    pub team_average: f64,
    pub status: PerformanceStatus,
    pub rank: usize,
    pub team_size: usize,
    pub team_max: u64,
    pub team_min: u64,
    pub daily_average: u64,
    pub strengths: Vec<&'static str>,
    pub suggestions: Vec<&'static str>,
    pub training: Vec<TrainingItem>,
}

impl UserPerformance {
    pub fn rank_label(&self) -> String {
        format!("{} از {}", self.rank, self.team_size)
    }
}

pub fn evaluate_user(roster: &Roster, overview: &TeamOverview, name: &str) -> Option<UserPerformance> {
    let user = roster.find(name)?;
    let calls = user.call_count;
    let team_size = roster.users.len();
    let team_average = if team_size > 0 {
        overview.total_calls as f64 / team_size as f64
    } else {
        0.0
    };
    let share_pct = if overview.total_calls > 0 {
        (calls as f64 / overview.total_calls as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };
    let calls_f = calls as f64;

    Some(UserPerformance {
        name: user.name.clone(),
        note: user
            .note
            .clone()
            .unwrap_or_else(|| "کارشناس فروش".to_string()),
        calls,
        share_pct,
        team_average,
        status: PerformanceStatus::from_calls(calls_f, team_average),
        rank: roster.rank_of(name).unwrap_or(team_size),
        team_size,
        team_max: roster.max_calls(),
        team_min: roster.min_calls(),
        daily_average: ((calls_f / 30.0).round() as u64).max(1),
        strengths: strengths(calls_f, team_average),
        suggestions: suggestions(calls_f, team_average),
        training: training(calls_f, team_average),
    })
}

fn strengths(calls: f64, average: f64) -> Vec<&'static str> {
    if average == 0.0 {
        return vec!["در انتظار داده‌های بیشتر برای تحلیل"];
    }
    let mut items = if calls > average * 1.5 {
        vec![
            "عملکرد بسیار بالا و قابل تقدیر",
            "حجم تماس به مراتب بیشتر از میانگین تیم",
        ]
    } else if calls > average * 1.2 {
        vec!["حجم تماس بالاتر از میانگین تیم", "عملکرد مطلوب و قابل توجه"]
    } else if calls > average {
        vec!["فعالیت بیش از حد انتظار"]
    } else {
        vec!["پشتکار و تلاش مستمر"]
    };
    items.push("مشارکت فعال در اهداف تیمی");
    items.push("انگیزه و پشتکار در انجام وظایف محوله");
    items
}

fn suggestions(calls: f64, average: f64) -> Vec<&'static str> {
    if average == 0.0 {
        return vec![
            "افزایش تعداد تماس‌های روزانه",
            "برنامه‌ریزی منظم برای تماس با مشتریان",
        ];
    }
    let mut items = if calls < average * 0.7 {
        vec![
            "افزایش قابل توجه تعداد تماس‌های روزانه",
            "بررسی دقیق موانع و چالش‌های موجود",
            "مشاوره با مدیر تیم برای بهبود عملکرد",
        ]
    } else if calls < average {
        vec![
            "افزایش تدریجی تعداد تماس‌ها",
            "تمرکز بر بهبود کیفیت تعاملات",
        ]
    } else {
        vec!["ایفای نقش مربیگری برای همکاران کم‌تجربه"]
    };
    items.push("یادگیری تکنیک‌های پیشرفته ارتباط با مشتری");
    items.push("شرکت منظم در جلسات آموزشی و کارگاه‌ها");
    items
}

fn training(calls: f64, average: f64) -> Vec<TrainingItem> {
    let mut items = Vec::new();
    if average == 0.0 || calls < average * 0.8 {
        items.push(TrainingItem {
            icon: "fas fa-phone-volume",
            title: "مهارت‌های تماس تلفنی",
            description: "آموزش تکنیک‌های برقراری ارتباط موثر و حرفه‌ای",
        });
    }
    items.push(TrainingItem {
        icon: "fas fa-comments",
        title: "مهارت‌های ارتباطی پیشرفته",
        description: "شنوندگی فعال، همدلی و مدیریت گفتگو",
    });
    items.push(TrainingItem {
        icon: "fas fa-clock",
        title: "مدیریت زمان و بهره‌وری",
        description: "بهینه‌سازی فرآیند تماس و افزایش کارایی",
    });
    items.push(TrainingItem {
        icon: "fas fa-handshake",
        title: "تکنیک‌های فروش حرفه‌ای",
        description: "استراتژی‌های جذب، متقاعدسازی و بستن فروش",
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BestEntry, CallStatistics};

    fn sample_user(name: &str, calls: u64) -> ActiveUser {
        ActiveUser {
            name: name.to_string(),
            call_count: calls,
            note: None,
        }
    }

    fn sample_analysis() -> CallAnalysis {
        let mut analysis = CallAnalysis::default();
        analysis.text.seller_name = "—".to_string();
        analysis
    }

    #[test]
    fn statistics_users_win_over_every_fallback() {
        let mut analysis = sample_analysis();
        analysis.statistics.active_users = vec![sample_user("الف", 12)];
        analysis.best.seller = BestEntry {
            name: "ب".to_string(),
            reason: "x".to_string(),
        };
        let roster = extract_roster(&analysis);
        assert_eq!(roster.source, RosterSource::Statistics);
        assert_eq!(roster.users[0].name, "الف");
    }

    #[test]
    fn best_seller_is_promoted_with_successful_calls() {
        let mut analysis = sample_analysis();
        analysis.statistics.successful_calls = 33;
        analysis.best.seller = BestEntry {
            name: "کریمی".to_string(),
            reason: "بیشترین فروش".to_string(),
        };
        let roster = extract_roster(&analysis);
        assert_eq!(roster.source, RosterSource::BestSeller);
        assert_eq!(roster.users[0].call_count, 33);
        assert_eq!(roster.users[0].note.as_deref(), Some("بیشترین فروش"));
        assert!(!roster.counts_unknown);
    }

    #[test]
    fn seller_names_split_without_random_counts() {
        let mut analysis = sample_analysis();
        analysis.text.seller_name = "رضایی، احمدی, کریمی".to_string();
        analysis.statistics.call_types = vec![("احمدی".to_string(), 9)];
        let roster = extract_roster(&analysis);
        assert_eq!(roster.source, RosterSource::SellerNames);
        let counts: Vec<u64> = roster.users.iter().map(|u| u.call_count).collect();
        assert_eq!(counts, vec![0, 9, 0]);
        assert!(roster.counts_unknown);
        assert_eq!(extract_roster(&analysis), roster);
    }

    #[test]
    fn call_types_become_users_when_nothing_else_exists() {
        let mut analysis = sample_analysis();
        analysis.statistics.call_types = vec![("ورودی".to_string(), 4), ("خروجی".to_string(), 6)];
        let roster = extract_roster(&analysis);
        assert_eq!(roster.source, RosterSource::CallTypes);
        assert_eq!(roster.total_calls(), 10);
    }

    #[test]
    fn empty_analysis_reports_insufficient_data() {
        let roster = extract_roster(&sample_analysis());
        assert_eq!(roster.source, RosterSource::InsufficientData);
        assert!(roster.is_empty());
    }

    #[test]
    fn overview_falls_back_to_roster_total() {
        let mut analysis = sample_analysis();
        analysis.statistics = CallStatistics {
            successful_calls: 10,
            active_users: vec![sample_user("الف", 15), sample_user("ب", 5)],
            ..CallStatistics::default()
        };
        let roster = extract_roster(&analysis);
        let overview = team_overview(&analysis, &roster);
        assert_eq!(overview.total_calls, 20);
        assert_eq!(overview.successful_calls, 10);
        assert_eq!(overview.success_rate, 50.0);
    }

    #[test]
    fn user_breakdown_ranks_and_grades() {
        let mut analysis = sample_analysis();
        analysis.statistics.total_calls = 100;
        analysis.statistics.active_users = vec![
            sample_user("الف", 20),
            sample_user("ب", 60),
            sample_user("ج", 20),
        ];
        let roster = extract_roster(&analysis);
        let overview = team_overview(&analysis, &roster);

        let top = evaluate_user(&roster, &overview, "ب").expect("user exists");
        assert_eq!(top.rank_label(), "1 از 3");
        assert_eq!(top.share_pct, 60.0);
        assert_eq!(top.status, PerformanceStatus::Excellent);
        assert_eq!(top.daily_average, 2);
        assert_eq!(top.team_max, 60);
        assert_eq!(top.team_min, 20);
        assert_eq!(top.training.len(), 3);

        let low = evaluate_user(&roster, &overview, "ج").expect("user exists");
        assert_eq!(low.rank, 3);
        assert_eq!(low.status, PerformanceStatus::NeedsImprovement);
        assert_eq!(low.daily_average, 1);
        assert_eq!(low.training.len(), 4);
        assert_eq!(low.suggestions.len(), 5);

        assert!(evaluate_user(&roster, &overview, "missing").is_none());
    }
}
