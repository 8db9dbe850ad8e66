//! Referral workflow analysis: ticket status, bottlenecks, subjects, units, institutions.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::coerce;
use crate::models::AnalysisMeta;
use crate::normalize::NormalizeError;

pub const STATUS_PENDING: &str = "بررسی نشده";
pub const STATUS_IN_PROGRESS: &str = "درحال پیگیری";
pub const STATUS_COMPLETED: &str = "اتمام کار";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitCount {
    pub unit: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusAnalysis {
    pub distribution: Vec<(String, u64)>,
    pub percent_pending: f64,
    pub percent_completed: f64,
    pub avg_days_pending: f64,
    pub bottleneck: Option<UnitCount>,
    pub busiest_receiver: Option<UnitCount>,
    pub daily_counts: Vec<(String, u64)>,
}

impl StatusAnalysis {
    pub fn total(&self) -> u64 {
        self.distribution.iter().map(|(_, count)| count).sum()
    }

    pub fn count_of(&self, status: &str) -> u64 {
        self.distribution
            .iter()
            .find(|(label, _)| label == status)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusBar {
    pub label: String,
    pub count: u64,
    pub percent: f64,
}

/// One bar per status, each `count / total` as a percentage. A zero total yields zero-width bars.
pub fn status_bars(distribution: &[(String, u64)]) -> Vec<StatusBar> {
    let total: u64 = distribution.iter().map(|(_, count)| count).sum();
    distribution
        .iter()
        .map(|(label, count)| StatusBar {
            label: label.clone(),
            count: *count,
            percent: if total == 0 {
                0.0
            } else {
                *count as f64 / total as f64 * 100.0
            },
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubjectAnalysis {
    pub most_frequent: Option<String>,
    pub frequency: u64,
    pub pending: Vec<(String, u64)>,
    pub response_days: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitPair {
    pub from: String,
    pub to: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnitAnalysis {
    pub top_senders: Vec<UnitCount>,
    pub top_receivers: Vec<UnitCount>,
    pub common_pairs: Vec<UnitPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Institution {
    pub name: String,
    pub count: u64,
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstitutionAnalysis {
    pub top: Vec<Institution>,
    pub subscription_correlation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurringPattern {
    pub pattern: String,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collaboration {
    pub units: Vec<String>,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Insights {
    pub summary: Option<String>,
    pub recommendations: Vec<String>,
    pub recurring_patterns: Vec<RecurringPattern>,
    pub completion_factors: Vec<String>,
    pub collaborating_units: Vec<Collaboration>,
    pub description_impact: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferralAnalysis {
    pub meta: AnalysisMeta,
    pub status: StatusAnalysis,
    pub subjects: SubjectAnalysis,
    pub units: UnitAnalysis,
    pub institutions: InstitutionAnalysis,
    pub insights: Insights,
}

pub fn normalize_referral(payload: &Value) -> Result<ReferralAnalysis, NormalizeError> {
    let root = payload
        .as_object()
        .ok_or_else(|| NormalizeError::NotAnObject(coerce::kind(payload)))?;
    let empty = Map::new();
    let section = |key: &str| coerce::object_at(root, key).unwrap_or(&empty);

    Ok(ReferralAnalysis {
        meta: AnalysisMeta {
            id: root.get("id").and_then(Value::as_i64),
            file_name: coerce::text_at(root, "file_name"),
            analyzed_at: coerce::timestamp_at(root, "analyzed_at"),
        },
        status: read_status(section("status_analysis")),
        subjects: read_subjects(section("subject_analysis")),
        units: read_units(section("sender_receiver_analysis")),
        institutions: read_institutions(section("institution_analysis")),
        insights: read_insights(section("comprehensive_insights")),
    })
}

fn unit_count(value: Option<&Value>, name_key: &str) -> Option<UnitCount> {
    let record = value?.as_object()?;
    Some(UnitCount {
        unit: coerce::first_text(record, &[name_key, "unit", "name"])?,
        count: coerce::count_at(record, "count"),
    })
}

fn unit_counts(value: Option<&Value>, name_key: &str) -> Vec<UnitCount> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| unit_count(Some(item), name_key))
                .collect()
        })
        .unwrap_or_default()
}

fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn read_status(status: &Map<String, Value>) -> StatusAnalysis {
    let mut analysis = StatusAnalysis {
        distribution: status
            .get("status_distribution")
            .map(coerce::count_map)
            .unwrap_or_default(),
        avg_days_pending: coerce::number_at(status, "avg_days_pending"),
        bottleneck: unit_count(status.get("worst_sender_pending"), "unit"),
        busiest_receiver: unit_count(status.get("receiver_with_most_in_progress"), "receiver"),
        daily_counts: status
            .get("daily_counts")
            .map(coerce::count_map)
            .unwrap_or_default(),
        ..StatusAnalysis::default()
    };

    let total = analysis.total();
    analysis.percent_pending = match status.get("percent_pending") {
        Some(value) if !value.is_null() => coerce::number(value),
        _ => percent_of(analysis.count_of(STATUS_PENDING), total),
    };
    analysis.percent_completed = match status.get("percent_completed") {
        Some(value) if !value.is_null() => coerce::number(value),
        _ => percent_of(analysis.count_of(STATUS_COMPLETED), total),
    };
    analysis
}

fn read_subjects(subject: &Map<String, Value>) -> SubjectAnalysis {
    SubjectAnalysis {
        most_frequent: coerce::text_at(subject, "most_frequent_subject"),
        frequency: coerce::count_at(subject, "subject_frequency"),
        pending: subject
            .get("subject_pending")
            .map(coerce::count_map)
            .unwrap_or_default(),
        response_days: subject
            .get("subject_response_time")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .map(|(name, days)| (name.clone(), coerce::number(days)))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn read_units(units: &Map<String, Value>) -> UnitAnalysis {
    UnitAnalysis {
        top_senders: unit_counts(units.get("top_senders"), "sender"),
        top_receivers: unit_counts(units.get("top_receivers"), "receiver"),
        common_pairs: units
            .get("common_pairs")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .filter_map(|pair| {
                        Some(UnitPair {
                            from: coerce::text_at(pair, "from")?,
                            to: coerce::text_at(pair, "to")?,
                            count: coerce::count_at(pair, "count"),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn read_institutions(institution: &Map<String, Value>) -> InstitutionAnalysis {
    InstitutionAnalysis {
        top: institution
            .get("top_institutions")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .filter_map(|record| {
                        Some(Institution {
                            name: coerce::text_at(record, "name")?,
                            count: coerce::count_at(record, "count"),
                            subscription: coerce::text_at(record, "subs"),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default(),
        subscription_correlation: coerce::number_at(institution, "subscription_correlation"),
    }
}

fn read_insights(insights: &Map<String, Value>) -> Insights {
    Insights {
        summary: coerce::text_at(insights, "summary_fa"),
        recommendations: coerce::string_list_at(insights, "recommendations_fa"),
        recurring_patterns: insights
            .get("recurring_patterns")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::Object(record) => Some(RecurringPattern {
                            pattern: coerce::text_at(record, "pattern")?,
                            frequency: coerce::text_at(record, "frequency").unwrap_or_default(),
                        }),
                        other => coerce::text(other).map(|pattern| RecurringPattern {
                            pattern,
                            frequency: String::new(),
                        }),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        completion_factors: coerce::string_list_at(insights, "completion_factors"),
        collaborating_units: insights
            .get("collaborating_units")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|record| Collaboration {
                        units: coerce::string_list_at(record, "units"),
                        success_rate: coerce::number_at(record, "success_rate"),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        description_impact: coerce::bool_at(insights, "description_impact"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> Value {
        json!({
            "id": 7,
            "file_name": "referrals.xlsx",
            "status_analysis": {
                "status_distribution": {"بررسی نشده": 3, "درحال پیگیری": 2, "اتمام کار": 5},
                "avg_days_pending": 4.5,
                "worst_sender_pending": {"unit": "فنی", "count": 3},
                "receiver_with_most_in_progress": {"receiver": "مالی", "count": 2},
                "daily_counts": {"2025-03-01": 4, "2025-03-02": 6}
            },
            "subject_analysis": {
                "most_frequent_subject": "تمدید",
                "subject_frequency": 6,
                "subject_pending": {"تمدید": 2},
                "subject_response_time": {"تمدید": 1.5}
            },
            "sender_receiver_analysis": {
                "top_senders": [{"sender": "فروش", "count": 8}],
                "top_receivers": [{"receiver": "فنی", "count": 5}],
                "common_pairs": [{"from": "فروش", "to": "فنی", "count": 4}, {"from": "x"}]
            },
            "institution_analysis": {
                "top_institutions": [{"name": "مدرسه الف", "count": 3, "subs": "طلایی"}],
                "subscription_correlation": 0.62
            },
            "comprehensive_insights": {
                "summary_fa": "روند مناسب",
                "recommendations_fa": ["پیگیری سریع‌تر"],
                "recurring_patterns": [{"pattern": "تاخیر فنی", "frequency": "زیاد"}],
                "completion_factors": ["توضیح کامل"],
                "collaborating_units": [{"units": ["فروش", "فنی"], "success_rate": 0.8}],
                "description_impact": true
            }
        })
    }

    #[test]
    fn referral_payload_is_fully_ingested() {
        let analysis = normalize_referral(&sample_payload()).expect("object payload");
        assert_eq!(analysis.meta.id, Some(7));
        assert_eq!(analysis.status.total(), 10);
        assert_eq!(analysis.status.percent_pending, 30.0);
        assert_eq!(analysis.status.percent_completed, 50.0);
        assert_eq!(analysis.status.bottleneck.as_ref().map(|b| b.count), Some(3));
        assert_eq!(
            analysis.status.busiest_receiver.as_ref().map(|b| b.unit.as_str()),
            Some("مالی")
        );
        assert_eq!(analysis.subjects.most_frequent.as_deref(), Some("تمدید"));
        assert_eq!(analysis.units.common_pairs.len(), 1);
        assert_eq!(analysis.institutions.top[0].subscription.as_deref(), Some("طلایی"));
        assert_eq!(analysis.insights.collaborating_units[0].units.len(), 2);
        assert!(analysis.insights.description_impact);
    }

    #[test]
    fn explicit_percentages_win_over_derived_ones() {
        let payload = json!({
            "status_analysis": {
                "status_distribution": {"بررسی نشده": 1, "اتمام کار": 1},
                "percent_pending": 12.5
            }
        });
        let analysis = normalize_referral(&payload).expect("object payload");
        assert_eq!(analysis.status.percent_pending, 12.5);
        assert_eq!(analysis.status.percent_completed, 50.0);
    }

    #[test]
    fn status_bars_sum_to_one_hundred() {
        let distribution = vec![
            ("pending".to_string(), 3),
            ("in_progress".to_string(), 2),
            ("done".to_string(), 5),
        ];
        let bars = status_bars(&distribution);
        assert_eq!(bars.len(), 3);
        let percents: Vec<String> = bars.iter().map(|b| format!("{:.1}", b.percent)).collect();
        assert_eq!(percents, vec!["30.0", "20.0", "50.0"]);
        let sum: f64 = bars.iter().map(|b| b.percent).sum();
        assert!((sum - 100.0).abs() < 0.1);
    }

    #[test]
    fn empty_distribution_yields_zero_width_bars() {
        let bars = status_bars(&[("pending".to_string(), 0)]);
        assert_eq!(bars[0].percent, 0.0);
        assert!(status_bars(&[]).is_empty());
    }

    #[test]
    fn missing_sections_default_quietly() {
        let analysis = normalize_referral(&json!({})).expect("object payload");
        assert_eq!(analysis.status.total(), 0);
        assert_eq!(analysis.status.percent_pending, 0.0);
        assert!(analysis.status.bottleneck.is_none());
        assert!(analysis.insights.summary.is_none());
        assert!(normalize_referral(&json!(null)).is_err());
    }
}
