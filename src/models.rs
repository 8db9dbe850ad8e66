use chrono::NaiveDateTime;
use serde::Serialize;

use crate::fields;

pub const DIMENSION_COUNT: usize = 9;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisMeta {
    pub id: Option<i64>,
    pub file_name: Option<String>,
    pub analyzed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScoreDimension {
    Communication,
    NeedsAssessment,
    ValuePitch,
    ObjectionHandling,
    PriceTransparency,
    Closing,
    FollowUp,
    EmotionalAlignment,
    Listening,
}

impl ScoreDimension {
    pub const ALL: [ScoreDimension; DIMENSION_COUNT] = [
        ScoreDimension::Communication,
        ScoreDimension::NeedsAssessment,
        ScoreDimension::ValuePitch,
        ScoreDimension::ObjectionHandling,
        ScoreDimension::PriceTransparency,
        ScoreDimension::Closing,
        ScoreDimension::FollowUp,
        ScoreDimension::EmotionalAlignment,
        ScoreDimension::Listening,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Key inside the canonical scores group and both reason groups.
    pub fn wire_key(self) -> &'static str {
        fields::SCORE_DIMENSIONS[self.index()]
    }

    /// Key inside the raw numeric group.
    pub fn raw_key(self) -> String {
        format!("{}{}", fields::SCORE_PREFIX, self.wire_key())
    }

    pub fn label(self) -> String {
        self.wire_key().replace('_', " ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreSet {
    pub overall: f64,
    pub dimensions: [f64; DIMENSION_COUNT],
}

impl ScoreSet {
    pub fn get(&self, dimension: ScoreDimension) -> f64 {
        self.dimensions[dimension.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScoreDimension, f64)> + '_ {
        ScoreDimension::ALL
            .iter()
            .map(move |dimension| (*dimension, self.get(*dimension)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscProfile {
    pub dominance: f64,
    pub influence: f64,
    pub steadiness: f64,
    pub conscientiousness: f64,
    pub dominant_type: String,
    pub evidence: Vec<String>,
    pub guidance: String,
}

impl DiscProfile {
    pub fn axes(&self) -> [f64; 4] {
        [
            self.dominance,
            self.influence,
            self.steadiness,
            self.conscientiousness,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericIndicators {
    pub lead_quality_pct: f64,
    pub open_questions: f64,
    pub objections: f64,
    pub objection_success_pct: f64,
    pub closing_attempts: f64,
    pub customer_sentiment: f64,
    pub closing_readiness_pct: f64,
    pub seller_tech_density_pct: f64,
    pub customer_tech_density_pct: f64,
    pub price_sensitivity_pct: f64,
    pub risk_sensitivity_pct: f64,
    pub time_sensitivity_pct: f64,
    pub stepped_yes_count: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextFields {
    pub seller_name: String,
    pub seller_code: String,
    pub customer_name: String,
    pub call_duration: String,
    pub call_direction: String,
    pub call_stage: String,
    pub call_warmth: String,
    pub call_nature: String,
    pub product: String,
    pub seller_level: String,
    pub channel_preference: String,
    pub customer_awareness: String,
    pub customer_to_seller_talk: String,
    pub seller_to_customer_talk: String,
    pub summary: String,
    pub personality_analysis: String,
    pub performance_evaluation: String,
    pub readiness_diagnosis: String,
    pub next_action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListFields {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub objections: Vec<String>,
    pub techniques: Vec<String>,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub risks: Vec<String>,
    pub missed_parameters: Vec<String>,
    pub common_mistakes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReasonSets {
    pub increase: [Vec<String>; DIMENSION_COUNT],
    pub decrease: [Vec<String>; DIMENSION_COUNT],
}

impl ReasonSets {
    pub fn increase_for(&self, dimension: ScoreDimension) -> &[String] {
        &self.increase[dimension.index()]
    }

    pub fn decrease_for(&self, dimension: ScoreDimension) -> &[String] {
        &self.decrease[dimension.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveUser {
    pub name: String,
    pub call_count: u64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCustomer {
    pub name: String,
    pub contact_count: u64,
    pub interaction_quality: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallStatistics {
    pub total_calls: u64,
    pub successful_calls: u64,
    pub unanswered_calls: u64,
    pub referred_calls: u64,
    pub active_users: Vec<ActiveUser>,
    pub top_customers: Vec<TopCustomer>,
    pub call_types: Vec<(String, u64)>,
}

impl CallStatistics {
    pub fn success_rate(&self) -> f64 {
        crate::grade::success_rate(self.successful_calls, self.total_calls)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestEntry {
    pub name: String,
    pub reason: String,
}

impl BestEntry {
    pub fn undetermined() -> Self {
        Self {
            name: fields::PLACEHOLDER.to_string(),
            reason: fields::NOT_DETERMINED.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        is_placeholder(&self.name)
    }
}

impl Default for BestEntry {
    fn default() -> Self {
        Self::undetermined()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BestOf {
    pub seller: BestEntry,
    pub customer: BestEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallAnalysis {
    pub meta: AnalysisMeta,
    pub scores: ScoreSet,
    pub disc: DiscProfile,
    pub indicators: NumericIndicators,
    pub text: TextFields,
    pub lists: ListFields,
    pub statistics: CallStatistics,
    pub best: BestOf,
    pub reasons: ReasonSets,
}

pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == fields::PLACEHOLDER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_map_to_wire_and_raw_keys() {
        assert_eq!(ScoreDimension::Communication.wire_key(), "برقراری_ارتباط");
        assert_eq!(ScoreDimension::Listening.raw_key(), "امتیاز_شنوندگی");
        assert_eq!(ScoreDimension::ValuePitch.label(), "ارزش فروشی");
        for (index, dimension) in ScoreDimension::ALL.iter().enumerate() {
            assert_eq!(dimension.index(), index);
        }
    }

    #[test]
    fn success_rate_uses_statistics_counts() {
        let stats = CallStatistics {
            total_calls: 100,
            successful_calls: 70,
            ..CallStatistics::default()
        };
        assert!((stats.success_rate() - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn best_entries_default_to_placeholder() {
        let best = BestOf::default();
        assert!(best.seller.is_placeholder());
        assert_eq!(best.customer.reason, fields::NOT_DETERMINED);
    }
}
