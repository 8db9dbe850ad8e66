//! Reconciles the backend's call-analysis layouts into one canonical view model.
//!
//! Two layouts exist on the wire. The canonical layout already carries the grouped
//! `امتیازها`/`DISC`/`لیست‌ها` sections and passes through untouched. The raw layout carries
//! flat numeric, text, and list groups; every canonical field is projected from it with an
//! explicit default, so the result never has holes.

use log::debug;
use serde_json::{json, Map, Value};

use crate::coerce;
use crate::fields::{self, TextDefault};
use crate::models::{
    ActiveUser, AnalysisMeta, BestEntry, BestOf, CallAnalysis, CallStatistics, DiscProfile,
    ListFields, NumericIndicators, ReasonSets, ScoreDimension, ScoreSet, TextFields, TopCustomer,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("analysis payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

pub fn is_canonical(payload: &Map<String, Value>) -> bool {
    coerce::truthy(payload, fields::SCORES).is_some()
}

pub fn to_canonical(payload: Value) -> Result<Value, NormalizeError> {
    let Value::Object(map) = payload else {
        return Err(NormalizeError::NotAnObject(coerce::kind(&payload)));
    };

    if is_canonical(&map) {
        debug!("payload already canonical, passing through");
        return Ok(Value::Object(map));
    }

    debug!("projecting raw payload onto canonical layout");
    Ok(project_raw(&map))
}

pub fn normalize(payload: Value) -> Result<CallAnalysis, NormalizeError> {
    let meta = match &payload {
        Value::Object(map) => read_meta(map),
        other => return Err(NormalizeError::NotAnObject(coerce::kind(other))),
    };
    let canonical = to_canonical(payload)?;
    let map = canonical
        .as_object()
        .ok_or(NormalizeError::NotAnObject("non-object"))?;
    Ok(ingest(meta, map))
}

fn group(payload: &Map<String, Value>, key: &str) -> Map<String, Value> {
    coerce::object_at(payload, key).cloned().unwrap_or_default()
}

fn or_default(source: &Map<String, Value>, key: &str, default: Value) -> Value {
    coerce::truthy(source, key).cloned().unwrap_or(default)
}

fn project_raw(payload: &Map<String, Value>) -> Value {
    let nums = group(payload, fields::NUMERIC);
    let text = group(payload, fields::TEXT);
    let lists = group(payload, fields::RAW_LISTS);
    let stats = group(payload, fields::STATS);
    let best = group(payload, fields::BEST);
    let reasons_dec = payload
        .get(fields::REASONS_DECREASE)
        .map(coerce::merged_object)
        .unwrap_or_default();
    let reasons_inc = payload
        .get(fields::REASONS_INCREASE)
        .map(coerce::merged_object)
        .unwrap_or_default();

    let mut scores = Map::new();
    scores.insert(
        fields::OVERALL_SCORE.to_string(),
        or_default(&nums, fields::OVERALL_SCORE, json!(0)),
    );
    for dimension in ScoreDimension::ALL {
        scores.insert(
            dimension.wire_key().to_string(),
            or_default(&nums, &dimension.raw_key(), json!(0)),
        );
    }

    let mut disc = Map::new();
    for key in fields::DISC_KEYS {
        disc.insert(key.to_string(), or_default(&nums, key, json!(0)));
    }

    let mut numeric = Map::new();
    for key in fields::NUMERIC_FIELDS {
        numeric.insert(key.to_string(), or_default(&nums, key, json!(0)));
    }

    let mut texts = Map::new();
    for (key, default) in fields::TEXT_FIELDS {
        texts.insert(key.to_string(), or_default(&text, key, default.to_value()));
    }

    let mut list_group = Map::new();
    for key in fields::LIST_FIELDS {
        list_group.insert(key.to_string(), or_default(&lists, key, json!([])));
    }

    let mut statistics = Map::new();
    for key in fields::CALL_COUNT_FIELDS {
        statistics.insert(key.to_string(), or_default(&stats, key, json!(0)));
    }
    statistics.insert(
        fields::ACTIVE_USERS.to_string(),
        or_default(&stats, fields::ACTIVE_USERS, json!([])),
    );
    statistics.insert(
        fields::TOP_CUSTOMERS.to_string(),
        or_default(&stats, fields::TOP_CUSTOMERS, json!([])),
    );
    statistics.insert(
        fields::CALL_TYPES.to_string(),
        or_default(&stats, fields::CALL_TYPES, json!({})),
    );

    let mut undetermined = Map::new();
    undetermined.insert(fields::NAME.to_string(), json!(fields::PLACEHOLDER));
    undetermined.insert(fields::REASON.to_string(), json!(fields::NOT_DETERMINED));
    let undetermined = Value::Object(undetermined);
    let mut best_group = Map::new();
    best_group.insert(
        fields::BEST_SELLER.to_string(),
        or_default(&best, fields::BEST_SELLER, undetermined.clone()),
    );
    best_group.insert(
        fields::BEST_CUSTOMER.to_string(),
        or_default(&best, fields::BEST_CUSTOMER, undetermined),
    );

    let mut decrease = Map::new();
    let mut increase = Map::new();
    for dimension in ScoreDimension::ALL {
        let key = dimension.wire_key();
        decrease.insert(key.to_string(), or_default(&reasons_dec, key, json!([])));
        increase.insert(key.to_string(), or_default(&reasons_inc, key, json!([])));
    }

    let mut canonical = Map::new();
    canonical.insert(fields::SCORES.to_string(), Value::Object(scores));
    canonical.insert(fields::DISC.to_string(), Value::Object(disc));
    canonical.insert(fields::NUMERIC.to_string(), Value::Object(numeric));
    canonical.insert(fields::TEXT.to_string(), Value::Object(texts));
    canonical.insert(fields::LISTS.to_string(), Value::Object(list_group));
    canonical.insert(fields::STATS.to_string(), Value::Object(statistics));
    canonical.insert(fields::BEST.to_string(), Value::Object(best_group));
    canonical.insert(fields::REASONS_DECREASE.to_string(), Value::Object(decrease));
    canonical.insert(fields::REASONS_INCREASE.to_string(), Value::Object(increase));
    Value::Object(canonical)
}

fn read_meta(payload: &Map<String, Value>) -> AnalysisMeta {
    AnalysisMeta {
        id: payload.get("id").and_then(Value::as_i64),
        file_name: coerce::text_at(payload, "file_name"),
        analyzed_at: coerce::timestamp_at(payload, "analyzed_at")
            .or_else(|| coerce::timestamp_at(payload, "created_at")),
    }
}

fn ingest(meta: AnalysisMeta, canonical: &Map<String, Value>) -> CallAnalysis {
    let empty = Map::new();
    let scores = coerce::object_at(canonical, fields::SCORES).unwrap_or(&empty);
    let nums = coerce::object_at(canonical, fields::NUMERIC).unwrap_or(&empty);
    let disc = coerce::object_at(canonical, fields::DISC).unwrap_or(nums);
    let text = coerce::object_at(canonical, fields::TEXT).unwrap_or(&empty);
    let lists = coerce::object_at(canonical, fields::LISTS)
        .or_else(|| coerce::object_at(canonical, fields::RAW_LISTS))
        .unwrap_or(&empty);
    let stats = coerce::object_at(canonical, fields::STATS).unwrap_or(&empty);
    let best = coerce::object_at(canonical, fields::BEST).unwrap_or(&empty);
    let reasons_dec = canonical
        .get(fields::REASONS_DECREASE)
        .map(coerce::merged_object)
        .unwrap_or_default();
    let reasons_inc = canonical
        .get(fields::REASONS_INCREASE)
        .map(coerce::merged_object)
        .unwrap_or_default();

    CallAnalysis {
        meta,
        scores: read_scores(scores),
        disc: read_disc(disc, text),
        indicators: read_indicators(nums),
        text: read_text(text),
        lists: read_lists(lists),
        statistics: read_statistics(stats),
        best: BestOf {
            seller: read_best(best.get(fields::BEST_SELLER)),
            customer: read_best(best.get(fields::BEST_CUSTOMER)),
        },
        reasons: read_reasons(&reasons_inc, &reasons_dec),
    }
}

fn read_scores(scores: &Map<String, Value>) -> ScoreSet {
    let mut set = ScoreSet {
        overall: coerce::number_at(scores, fields::OVERALL_SCORE),
        ..ScoreSet::default()
    };
    for dimension in ScoreDimension::ALL {
        set.dimensions[dimension.index()] = coerce::number_at(scores, dimension.wire_key());
    }
    set
}

fn read_disc(disc: &Map<String, Value>, text: &Map<String, Value>) -> DiscProfile {
    DiscProfile {
        dominance: coerce::number_at(disc, fields::DISC_D),
        influence: coerce::number_at(disc, fields::DISC_I),
        steadiness: coerce::number_at(disc, fields::DISC_S),
        conscientiousness: coerce::number_at(disc, fields::DISC_C),
        dominant_type: text_field(text, fields::DISC_TYPE),
        evidence: coerce::string_list_at(text, fields::DISC_EVIDENCE),
        guidance: text_field(text, fields::DISC_GUIDE),
    }
}

fn read_indicators(nums: &Map<String, Value>) -> NumericIndicators {
    NumericIndicators {
        lead_quality_pct: coerce::number_at(nums, fields::LEAD_QUALITY_PCT),
        open_questions: coerce::number_at(nums, fields::OPEN_QUESTIONS),
        objections: coerce::number_at(nums, fields::OBJECTIONS),
        objection_success_pct: coerce::number_at(nums, fields::OBJECTION_SUCCESS_PCT),
        closing_attempts: coerce::number_at(nums, fields::CLOSING_ATTEMPTS),
        customer_sentiment: coerce::number_at(nums, fields::CUSTOMER_SENTIMENT),
        closing_readiness_pct: coerce::number_at(nums, fields::CLOSING_READINESS_PCT),
        seller_tech_density_pct: coerce::number_at(nums, fields::SELLER_TECH_DENSITY_PCT),
        customer_tech_density_pct: coerce::number_at(nums, fields::CUSTOMER_TECH_DENSITY_PCT),
        price_sensitivity_pct: coerce::number_at(nums, fields::PRICE_SENSITIVITY_PCT),
        risk_sensitivity_pct: coerce::number_at(nums, fields::RISK_SENSITIVITY_PCT),
        time_sensitivity_pct: coerce::number_at(nums, fields::TIME_SENSITIVITY_PCT),
        stepped_yes_count: coerce::number_at(nums, fields::STEPPED_YES_COUNT),
    }
}

/// Canonical payloads from older records may still be sparse, so text defaults apply here too.
fn text_field(text: &Map<String, Value>, key: &str) -> String {
    let fallback = fields::TEXT_FIELDS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, default)| match default {
            TextDefault::Sentence(sentence) => *sentence,
            TextDefault::Placeholder | TextDefault::EmptyList => fields::PLACEHOLDER,
        })
        .unwrap_or(fields::PLACEHOLDER);
    coerce::text_or(text, key, fallback)
}

fn read_text(text: &Map<String, Value>) -> TextFields {
    TextFields {
        seller_name: text_field(text, fields::SELLER_NAME),
        seller_code: text_field(text, fields::SELLER_CODE),
        customer_name: text_field(text, fields::CUSTOMER_NAME),
        call_duration: text_field(text, fields::CALL_DURATION),
        call_direction: text_field(text, fields::CALL_DIRECTION),
        call_stage: text_field(text, fields::CALL_STAGE),
        call_warmth: text_field(text, fields::CALL_WARMTH),
        call_nature: text_field(text, fields::CALL_NATURE),
        product: text_field(text, fields::PRODUCT),
        seller_level: text_field(text, fields::SELLER_LEVEL),
        channel_preference: text_field(text, fields::CHANNEL_PREFERENCE),
        customer_awareness: text_field(text, fields::CUSTOMER_AWARENESS),
        customer_to_seller_talk: text_field(text, fields::CUSTOMER_TO_SELLER_TALK),
        seller_to_customer_talk: text_field(text, fields::SELLER_TO_CUSTOMER_TALK),
        summary: text_field(text, fields::SUMMARY),
        personality_analysis: text_field(text, fields::PERSONALITY_ANALYSIS),
        performance_evaluation: text_field(text, fields::PERFORMANCE_EVALUATION),
        readiness_diagnosis: text_field(text, fields::READINESS_DIAGNOSIS),
        next_action: text_field(text, fields::NEXT_ACTION),
    }
}

fn read_lists(lists: &Map<String, Value>) -> ListFields {
    ListFields {
        strengths: coerce::string_list_at(lists, fields::STRENGTHS),
        weaknesses: coerce::string_list_at(lists, fields::WEAKNESSES),
        objections: coerce::string_list_at(lists, fields::OBJECTION_LIST),
        techniques: coerce::string_list_at(lists, fields::TECHNIQUES),
        positive_keywords: coerce::string_list_at(lists, fields::POSITIVE_KEYWORDS),
        negative_keywords: coerce::string_list_at(lists, fields::NEGATIVE_KEYWORDS),
        risks: coerce::string_list_at(lists, fields::RISKS),
        missed_parameters: coerce::string_list_at(lists, fields::MISSED_PARAMETERS),
        common_mistakes: coerce::string_list_at(lists, fields::COMMON_MISTAKES),
    }
}

fn read_statistics(stats: &Map<String, Value>) -> CallStatistics {
    CallStatistics {
        total_calls: coerce::count_at(stats, fields::TOTAL_CALLS),
        successful_calls: coerce::count_at(stats, fields::SUCCESSFUL_CALLS),
        unanswered_calls: coerce::count_at(stats, fields::UNANSWERED_CALLS),
        referred_calls: coerce::count_at(stats, fields::REFERRED_CALLS),
        active_users: stats
            .get(fields::ACTIVE_USERS)
            .map(read_active_users)
            .unwrap_or_default(),
        top_customers: stats
            .get(fields::TOP_CUSTOMERS)
            .map(read_top_customers)
            .unwrap_or_default(),
        call_types: stats
            .get(fields::CALL_TYPES)
            .map(coerce::count_map)
            .unwrap_or_default(),
    }
}

pub fn read_active_users(value: &Value) -> Vec<ActiveUser> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(ActiveUser {
                    name: coerce::first_text(record, &[fields::NAME, "name"])?,
                    call_count: coerce::first_count(
                        record,
                        &[fields::CALL_COUNT, "calls", "count"],
                    ),
                    note: coerce::first_text(record, &[fields::PERFORMANCE_NOTE, "note"]),
                }),
                other => coerce::text(other).map(|name| ActiveUser {
                    name,
                    call_count: 0,
                    note: None,
                }),
            })
            .collect(),
        Value::Object(_) => coerce::count_map(value)
            .into_iter()
            .map(|(name, call_count)| ActiveUser {
                name,
                call_count,
                note: None,
            })
            .collect(),
        Value::String(names) => coerce::split_names(names)
            .into_iter()
            .map(|name| ActiveUser {
                name,
                call_count: 0,
                note: None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn read_top_customers(value: &Value) -> Vec<TopCustomer> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(TopCustomer {
                    name: coerce::first_text(record, &[fields::NAME, "name"])?,
                    contact_count: coerce::first_count(record, &[fields::CALL_COUNT, "count"]),
                    interaction_quality: coerce::first_text(
                        record,
                        &[fields::INTERACTION_QUALITY, "quality"],
                    ),
                }),
                other => coerce::text(other).map(|name| TopCustomer {
                    name,
                    contact_count: 0,
                    interaction_quality: None,
                }),
            })
            .collect(),
        Value::Object(_) => coerce::count_map(value)
            .into_iter()
            .map(|(name, contact_count)| TopCustomer {
                name,
                contact_count,
                interaction_quality: None,
            })
            .collect(),
        Value::String(names) => coerce::split_names(names)
            .into_iter()
            .map(|name| TopCustomer {
                name,
                contact_count: 0,
                interaction_quality: None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn read_best(value: Option<&Value>) -> BestEntry {
    match value {
        Some(Value::Object(record)) => BestEntry {
            name: coerce::first_text(record, &[fields::NAME, "name"])
                .unwrap_or_else(|| fields::PLACEHOLDER.to_string()),
            reason: coerce::first_text(record, &[fields::REASON, "reason"])
                .unwrap_or_else(|| fields::NOT_DETERMINED.to_string()),
        },
        Some(other) => match coerce::text(other) {
            Some(name) => BestEntry {
                name,
                reason: fields::NOT_DETERMINED.to_string(),
            },
            None => BestEntry::undetermined(),
        },
        None => BestEntry::undetermined(),
    }
}

fn read_reasons(increase: &Map<String, Value>, decrease: &Map<String, Value>) -> ReasonSets {
    let mut reasons = ReasonSets::default();
    for dimension in ScoreDimension::ALL {
        reasons.increase[dimension.index()] =
            coerce::string_list_at(increase, dimension.wire_key());
        reasons.decrease[dimension.index()] =
            coerce::string_list_at(decrease, dimension.wire_key());
    }
    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raw() -> Value {
        json!({
            "id": 42,
            "file_name": "calls.xlsx",
            "analyzed_at": "2025-03-01T10:15:30.000001",
            "فیلدهای_عددی": {
                "امتیاز_کل": 7.4,
                "امتیاز_برقراری_ارتباط": 9,
                "امتیاز_شنوندگی": "6",
                "کیفیت_لید_درصد": 65,
                "disc_d": 8
            },
            "فیلدهای_متنی": {
                "نام_فروشنده": "رضایی، احمدی",
                "نام_مشتری": "",
                "disc_شواهد": "صراحت, عجله",
                "خلاصه": "تماس موفق بود"
            },
            "لیست_ها": {
                "نقاط_قوت": ["شنوندگی خوب"],
                "کلمات_منفی": {"a": "گران"}
            },
            "آمار": {
                "تعداد_کل_تماس_ها": 100,
                "تماس_های_موفق": 70,
                "کاربران_فعال": [{"نام": "رضایی", "تعداد_تماس": 40, "یادداشت_عملکرد": "فعال"}],
                "انواع_تماس": {"ورودی": 60, "خروجی": 40}
            },
            "بهترین_ها": {
                "بهترین_فروشنده": {"نام": "رضایی", "دلیل": "بیشترین فروش"}
            },
            "دلایل_کسب_امتیازها": [{"برقراری_ارتباط": ["سلام گرم"]}]
        })
    }

    fn sample_canonical() -> Value {
        json!({
            "امتیازها": {"امتیاز_کل": 8.5, "برقراری_ارتباط": 9, "شنوندگی": 12},
            "فیلدهای_متنی": {"نام_فروشنده": "کریمی"},
            "لیست‌ها": {"نقاط_ضعف": ["عجله"]}
        })
    }

    #[test]
    fn canonical_payloads_pass_through_unchanged() {
        let payload = sample_canonical();
        let out = to_canonical(payload.clone()).expect("object payload");
        assert_eq!(out, payload);

        let again = to_canonical(out.clone()).expect("object payload");
        assert_eq!(again, out);
    }

    #[test]
    fn raw_projection_defines_every_canonical_field() {
        let out = to_canonical(json!({})).expect("object payload");
        let root = out.as_object().expect("object");

        let scores = root[fields::SCORES].as_object().expect("scores");
        assert_eq!(scores.len(), 10);
        let numeric = root[fields::NUMERIC].as_object().expect("numeric");
        for key in fields::NUMERIC_FIELDS {
            assert_eq!(numeric[key], json!(0), "{key}");
        }
        let disc = root[fields::DISC].as_object().expect("disc");
        assert_eq!(disc.len(), 4);
        let text = root[fields::TEXT].as_object().expect("text");
        for (key, default) in fields::TEXT_FIELDS {
            assert_eq!(text[key], default.to_value(), "{key}");
        }
        let lists = root[fields::LISTS].as_object().expect("lists");
        for key in fields::LIST_FIELDS {
            assert_eq!(lists[key], json!([]), "{key}");
        }
        let stats = root[fields::STATS].as_object().expect("stats");
        for key in fields::CALL_COUNT_FIELDS {
            assert_eq!(stats[key], json!(0), "{key}");
        }
        assert_eq!(stats[fields::ACTIVE_USERS], json!([]));
        assert_eq!(stats[fields::TOP_CUSTOMERS], json!([]));
        assert_eq!(stats[fields::CALL_TYPES], json!({}));
        let best = root[fields::BEST].as_object().expect("best");
        assert_eq!(best[fields::BEST_SELLER][fields::NAME], json!(fields::PLACEHOLDER));
        assert_eq!(
            best[fields::BEST_CUSTOMER][fields::REASON],
            json!(fields::NOT_DETERMINED)
        );
        for group in [fields::REASONS_DECREASE, fields::REASONS_INCREASE] {
            let reasons = root[group].as_object().expect("reasons");
            assert_eq!(reasons.len(), 9);
            assert!(reasons.values().all(|value| value == &json!([])));
        }
    }

    #[test]
    fn raw_projection_keeps_present_values_and_defaults_falsy_ones() {
        let out = to_canonical(sample_raw()).expect("object payload");
        assert_eq!(out[fields::SCORES]["برقراری_ارتباط"], json!(9));
        assert_eq!(out[fields::SCORES]["شنوندگی"], json!("6"));
        assert_eq!(out[fields::TEXT][fields::CUSTOMER_NAME], json!("—"));
        assert_eq!(
            out[fields::REASONS_INCREASE]["برقراری_ارتباط"],
            json!(["سلام گرم"])
        );
    }

    #[test]
    fn non_object_payloads_fail_fast() {
        assert_eq!(
            to_canonical(json!([1, 2])),
            Err(NormalizeError::NotAnObject("array"))
        );
        assert!(normalize(json!("text")).is_err());
    }

    #[test]
    fn normalize_builds_a_complete_typed_model() {
        let analysis = normalize(sample_raw()).expect("object payload");
        assert_eq!(analysis.meta.id, Some(42));
        assert_eq!(analysis.meta.file_name.as_deref(), Some("calls.xlsx"));
        assert!((analysis.scores.overall - 7.4).abs() < 1e-9);
        assert_eq!(analysis.scores.get(ScoreDimension::Listening), 6.0);
        assert_eq!(analysis.scores.get(ScoreDimension::Closing), 0.0);
        assert_eq!(analysis.disc.dominance, 8.0);
        assert_eq!(analysis.disc.evidence, vec!["صراحت", "عجله"]);
        assert_eq!(analysis.disc.dominant_type, "—");
        assert_eq!(analysis.indicators.lead_quality_pct, 65.0);
        assert_eq!(analysis.indicators.objections, 0.0);
        assert_eq!(analysis.text.summary, "تماس موفق بود");
        assert_eq!(analysis.text.next_action, "اقدامی مشخص نشده");
        assert_eq!(analysis.lists.strengths, vec!["شنوندگی خوب"]);
        assert_eq!(analysis.lists.negative_keywords, vec!["گران"]);
        assert!(analysis.lists.risks.is_empty());
        assert_eq!(analysis.statistics.total_calls, 100);
        assert_eq!(analysis.statistics.active_users[0].call_count, 40);
        assert_eq!(analysis.statistics.call_types.len(), 2);
        assert_eq!(analysis.best.seller.name, "رضایی");
        assert!(analysis.best.customer.is_placeholder());
        assert_eq!(
            analysis.reasons.increase_for(ScoreDimension::Communication),
            ["سلام گرم".to_string()]
        );
        assert!(analysis.reasons.decrease_for(ScoreDimension::Closing).is_empty());
    }

    #[test]
    fn sparse_canonical_payloads_still_default_every_field() {
        let analysis = normalize(sample_canonical()).expect("object payload");
        assert_eq!(analysis.scores.overall, 8.5);
        assert_eq!(analysis.scores.get(ScoreDimension::Listening), 12.0);
        assert_eq!(analysis.text.seller_name, "کریمی");
        assert_eq!(analysis.text.product, "—");
        assert_eq!(analysis.lists.weaknesses, vec!["عجله"]);
        assert_eq!(analysis.statistics.total_calls, 0);
        assert!(analysis.best.seller.is_placeholder());
    }

    #[test]
    fn active_users_accept_names_maps_and_records() {
        let from_names = read_active_users(&json!(["الف", "ب"]));
        assert_eq!(from_names.len(), 2);
        assert_eq!(from_names[0].call_count, 0);

        let from_map = read_active_users(&json!({"الف": 5}));
        assert_eq!(from_map[0].call_count, 5);

        let from_records = read_active_users(&json!([{"name": "x", "calls": 3, "note": "n"}]));
        assert_eq!(from_records[0].call_count, 3);
        assert_eq!(from_records[0].note.as_deref(), Some("n"));
    }
}
