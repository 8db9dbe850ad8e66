use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBadge {
    Excellent,
    Medium,
    Weak,
}

impl ScoreBadge {
    pub fn classify(score: f64) -> Self {
        if score >= 8.0 {
            ScoreBadge::Excellent
        } else if score >= 6.0 {
            ScoreBadge::Medium
        } else {
            ScoreBadge::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBadge::Excellent => "عالی",
            ScoreBadge::Medium => "متوسط",
            ScoreBadge::Weak => "ضعیف",
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            ScoreBadge::Excellent => "badge-high",
            ScoreBadge::Medium => "badge-medium",
            ScoreBadge::Weak => "badge-low",
        }
    }

    pub fn bar_class(self) -> &'static str {
        match self {
            ScoreBadge::Excellent => "bg-green-500",
            ScoreBadge::Medium => "bg-yellow-500",
            ScoreBadge::Weak => "bg-red-500",
        }
    }

    pub fn text_class(self) -> &'static str {
        match self {
            ScoreBadge::Excellent => "text-green-600",
            ScoreBadge::Medium => "text-yellow-600",
            ScoreBadge::Weak => "text-red-600",
        }
    }

    pub fn pill_class(self) -> &'static str {
        match self {
            ScoreBadge::Excellent => "bg-green-100 text-green-800",
            ScoreBadge::Medium => "bg-yellow-100 text-yellow-800",
            ScoreBadge::Weak => "bg-red-100 text-red-800",
        }
    }
}

/// Three-tier classification for referral completion rates and health scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    Success,
    Warning,
    Danger,
}

impl Tier {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 70.0 {
            Tier::Success
        } else if rate >= 50.0 {
            Tier::Warning
        } else {
            Tier::Danger
        }
    }

    pub fn pill_class(self) -> &'static str {
        match self {
            Tier::Success => "bg-green-100 text-green-800",
            Tier::Warning => "bg-yellow-100 text-yellow-800",
            Tier::Danger => "bg-red-100 text-red-800",
        }
    }
}

pub const NEUTRAL_PILL: &str = "bg-gray-100 text-gray-800";

pub fn health_tier(score: Option<f64>) -> Option<Tier> {
    score.filter(|value| *value != 0.0).map(Tier::from_rate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    None,
    Elevated,
    High,
}

impl RiskLevel {
    pub fn from_count(count: u64) -> Self {
        match count {
            0 => RiskLevel::None,
            1..=2 => RiskLevel::Elevated,
            _ => RiskLevel::High,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            RiskLevel::None => "bg-gray-400",
            RiskLevel::Elevated => "bg-orange-600",
            RiskLevel::High => "bg-red-600",
        }
    }
}

/// Per-user call volume relative to the team average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceStatus {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
    Unknown,
}

impl PerformanceStatus {
    pub fn from_calls(user_calls: f64, average_calls: f64) -> Self {
        if average_calls == 0.0 {
            return PerformanceStatus::Unknown;
        }
        let ratio = user_calls / average_calls;
        if ratio >= 1.5 {
            PerformanceStatus::Excellent
        } else if ratio >= 1.0 {
            PerformanceStatus::Good
        } else if ratio >= 0.7 {
            PerformanceStatus::Average
        } else {
            PerformanceStatus::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceStatus::Excellent => "عالی",
            PerformanceStatus::Good => "خوب",
            PerformanceStatus::Average => "متوسط",
            PerformanceStatus::NeedsImprovement => "نیاز به بهبود",
            PerformanceStatus::Unknown => "نامشخص",
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            PerformanceStatus::Excellent => "badge badge-success",
            PerformanceStatus::Good | PerformanceStatus::Unknown => "badge badge-info",
            PerformanceStatus::Average => "badge badge-warning",
            PerformanceStatus::NeedsImprovement => "badge badge-danger",
        }
    }
}

pub fn success_rate(successful: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        successful as f64 / total as f64 * 100.0
    }
}

pub fn percent_label(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn correlation_label(correlation: f64) -> &'static str {
    if correlation > 0.5 {
        "همبستگی مثبت قوی"
    } else {
        "همبستگی ضعیف"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_badges_follow_fixed_thresholds() {
        assert_eq!(ScoreBadge::classify(8.0), ScoreBadge::Excellent);
        assert_eq!(ScoreBadge::classify(10.0), ScoreBadge::Excellent);
        assert_eq!(ScoreBadge::classify(6.0), ScoreBadge::Medium);
        assert_eq!(ScoreBadge::classify(7.99), ScoreBadge::Medium);
        assert_eq!(ScoreBadge::classify(5.99), ScoreBadge::Weak);
        assert_eq!(ScoreBadge::classify(0.0), ScoreBadge::Weak);
        assert_eq!(ScoreBadge::classify(-2.0), ScoreBadge::Weak);
    }

    #[test]
    fn rate_tiers_split_at_seventy_and_fifty() {
        assert_eq!(Tier::from_rate(70.0), Tier::Success);
        assert_eq!(Tier::from_rate(69.9), Tier::Warning);
        assert_eq!(Tier::from_rate(50.0), Tier::Warning);
        assert_eq!(Tier::from_rate(49.9), Tier::Danger);
        assert_eq!(health_tier(None), None);
        assert_eq!(health_tier(Some(0.0)), None);
        assert_eq!(health_tier(Some(82.0)), Some(Tier::Success));
    }

    #[test]
    fn risk_levels_escalate_past_two() {
        assert_eq!(RiskLevel::from_count(0), RiskLevel::None);
        assert_eq!(RiskLevel::from_count(2), RiskLevel::Elevated);
        assert_eq!(RiskLevel::from_count(3), RiskLevel::High);
    }

    #[test]
    fn performance_status_uses_ratio_to_average() {
        assert_eq!(PerformanceStatus::from_calls(30.0, 20.0), PerformanceStatus::Excellent);
        assert_eq!(PerformanceStatus::from_calls(20.0, 20.0), PerformanceStatus::Good);
        assert_eq!(PerformanceStatus::from_calls(14.0, 20.0), PerformanceStatus::Average);
        assert_eq!(PerformanceStatus::from_calls(5.0, 20.0), PerformanceStatus::NeedsImprovement);
        assert_eq!(PerformanceStatus::from_calls(5.0, 0.0), PerformanceStatus::Unknown);
    }

    #[test]
    fn success_rate_renders_with_one_decimal() {
        assert_eq!(percent_label(success_rate(70, 100)), "70.0%");
        assert_eq!(percent_label(success_rate(5, 0)), "0.0%");
        assert_eq!(percent_label(success_rate(1, 3)), "33.3%");
    }
}
