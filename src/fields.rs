//! Wire identifiers used by the analysis backend. These are literal JSON keys, not labels.

pub const PLACEHOLDER: &str = "—";
pub const NOT_DETERMINED: &str = "تعیین نشده";

pub const SCORES: &str = "امتیازها";
pub const DISC: &str = "DISC";
pub const NUMERIC: &str = "فیلدهای_عددی";
pub const TEXT: &str = "فیلدهای_متنی";
pub const RAW_LISTS: &str = "لیست_ها";
pub const LISTS: &str = "لیست\u{200c}ها";
pub const STATS: &str = "آمار";
pub const BEST: &str = "بهترین_ها";
pub const REASONS_DECREASE: &str = "دلایل_کاهش_امتیازها";
pub const REASONS_INCREASE: &str = "دلایل_کسب_امتیازها";

pub const OVERALL_SCORE: &str = "امتیاز_کل";
pub const SCORE_PREFIX: &str = "امتیاز_";

pub const SCORE_DIMENSIONS: [&str; 9] = [
    "برقراری_ارتباط",
    "نیازسنجی",
    "ارزش_فروشی",
    "مدیریت_اعتراض",
    "شفافیت_قیمت",
    "بستن_فروش",
    "پیگیری",
    "همسویی_احساسی",
    "شنوندگی",
];

pub const DISC_D: &str = "disc_d";
pub const DISC_I: &str = "disc_i";
pub const DISC_S: &str = "disc_s";
pub const DISC_C: &str = "disc_c";
pub const DISC_KEYS: [&str; 4] = [DISC_D, DISC_I, DISC_S, DISC_C];

pub const LEAD_QUALITY_PCT: &str = "کیفیت_لید_درصد";
pub const OPEN_QUESTIONS: &str = "تعداد_سوالات_باز";
pub const OBJECTIONS: &str = "تعداد_اعتراض";
pub const OBJECTION_SUCCESS_PCT: &str = "درصد_پاسخ_موفق_به_اعتراض";
pub const CLOSING_ATTEMPTS: &str = "تعداد_تلاش_برای_بستن";
pub const CUSTOMER_SENTIMENT: &str = "امتیاز_احساس_مشتری";
pub const CLOSING_READINESS_PCT: &str = "آمادگی_بستن_درصد";
pub const SELLER_TECH_DENSITY_PCT: &str = "چگالی_اطلاعات_فنی_فروشنده_درصد";
pub const CUSTOMER_TECH_DENSITY_PCT: &str = "چگالی_اطلاعات_فنی_مشتری_درصد";
pub const PRICE_SENSITIVITY_PCT: &str = "حساسیت_قیمت_مشتری_درصد";
pub const RISK_SENSITIVITY_PCT: &str = "حساسیت_ریسک_مشتری_درصد";
pub const TIME_SENSITIVITY_PCT: &str = "حساسیت_زمان_مشتری_درصد";
pub const STEPPED_YES_COUNT: &str = "تعداد_بله_پله_ای";

/// Numeric group in canonical order. Score entries appear with their `امتیاز_` prefix.
pub const NUMERIC_FIELDS: [&str; 27] = [
    OVERALL_SCORE,
    "امتیاز_برقراری_ارتباط",
    "امتیاز_نیازسنجی",
    "امتیاز_ارزش_فروشی",
    "امتیاز_مدیریت_اعتراض",
    "امتیاز_شفافیت_قیمت",
    "امتیاز_بستن_فروش",
    "امتیاز_پیگیری",
    "امتیاز_همسویی_احساسی",
    "امتیاز_شنوندگی",
    LEAD_QUALITY_PCT,
    OPEN_QUESTIONS,
    OBJECTIONS,
    OBJECTION_SUCCESS_PCT,
    CLOSING_ATTEMPTS,
    CUSTOMER_SENTIMENT,
    CLOSING_READINESS_PCT,
    SELLER_TECH_DENSITY_PCT,
    CUSTOMER_TECH_DENSITY_PCT,
    DISC_D,
    DISC_I,
    DISC_S,
    DISC_C,
    PRICE_SENSITIVITY_PCT,
    RISK_SENSITIVITY_PCT,
    TIME_SENSITIVITY_PCT,
    STEPPED_YES_COUNT,
];

pub const SELLER_NAME: &str = "نام_فروشنده";
pub const SELLER_CODE: &str = "کد_فروشنده";
pub const CUSTOMER_NAME: &str = "نام_مشتری";
pub const CALL_DURATION: &str = "مدت_تماس";
pub const CALL_DIRECTION: &str = "نوع_تماس_جهت";
pub const CALL_STAGE: &str = "نوع_تماس_مرحله";
pub const CALL_WARMTH: &str = "نوع_تماس_گرمی";
pub const CALL_NATURE: &str = "نوع_تماس_ماهیت";
pub const PRODUCT: &str = "محصول";
pub const SELLER_LEVEL: &str = "سطح_فروشنده";
pub const DISC_TYPE: &str = "disc_تیپ";
pub const DISC_EVIDENCE: &str = "disc_شواهد";
pub const DISC_GUIDE: &str = "disc_راهنما";
pub const CHANNEL_PREFERENCE: &str = "ترجیح_کانال";
pub const CUSTOMER_AWARENESS: &str = "سطح_آگاهی_مشتری";
pub const CUSTOMER_TO_SELLER_TALK: &str = "نسبت_زمان_صحبت_مشتری_به_فروشنده";
pub const SELLER_TO_CUSTOMER_TALK: &str = "نسبت_زمان_صحبت_فروشنده_به_مشتری";
pub const SUMMARY: &str = "خلاصه";
pub const PERSONALITY_ANALYSIS: &str = "تحلیل_شخصیت_مشتری";
pub const PERFORMANCE_EVALUATION: &str = "ارزیابی_عملکرد_فردی_فروشنده";
pub const READINESS_DIAGNOSIS: &str = "تشخیص_آمادگی";
pub const NEXT_ACTION: &str = "اقدام_بعدی";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDefault {
    Placeholder,
    Sentence(&'static str),
    EmptyList,
}

impl TextDefault {
    pub fn to_value(self) -> serde_json::Value {
        match self {
            TextDefault::Placeholder => serde_json::Value::from(PLACEHOLDER),
            TextDefault::Sentence(sentence) => serde_json::Value::from(sentence),
            TextDefault::EmptyList => serde_json::Value::Array(Vec::new()),
        }
    }
}

pub const TEXT_FIELDS: [(&str, TextDefault); 22] = [
    (SELLER_NAME, TextDefault::Placeholder),
    (SELLER_CODE, TextDefault::Placeholder),
    (CUSTOMER_NAME, TextDefault::Placeholder),
    (CALL_DURATION, TextDefault::Placeholder),
    (CALL_DIRECTION, TextDefault::Placeholder),
    (CALL_STAGE, TextDefault::Placeholder),
    (CALL_WARMTH, TextDefault::Placeholder),
    (CALL_NATURE, TextDefault::Placeholder),
    (PRODUCT, TextDefault::Placeholder),
    (SELLER_LEVEL, TextDefault::Placeholder),
    (DISC_TYPE, TextDefault::Placeholder),
    (DISC_EVIDENCE, TextDefault::EmptyList),
    (DISC_GUIDE, TextDefault::Placeholder),
    (CHANNEL_PREFERENCE, TextDefault::Placeholder),
    (CUSTOMER_AWARENESS, TextDefault::Placeholder),
    (CUSTOMER_TO_SELLER_TALK, TextDefault::Placeholder),
    (SELLER_TO_CUSTOMER_TALK, TextDefault::Placeholder),
    (SUMMARY, TextDefault::Sentence("خلاصه\u{200c}ای در دسترس نیست")),
    (PERSONALITY_ANALYSIS, TextDefault::Sentence("تحلیلی در دسترس نیست")),
    (
        PERFORMANCE_EVALUATION,
        TextDefault::Sentence("ارزیابی\u{200c}ای در دسترس نیست"),
    ),
    (READINESS_DIAGNOSIS, TextDefault::Sentence("تشخیصی در دسترس نیست")),
    (NEXT_ACTION, TextDefault::Sentence("اقدامی مشخص نشده")),
];

pub const STRENGTHS: &str = "نقاط_قوت";
pub const WEAKNESSES: &str = "نقاط_ضعف";
pub const OBJECTION_LIST: &str = "اعتراضات";
pub const TECHNIQUES: &str = "تکنیکها";
pub const POSITIVE_KEYWORDS: &str = "کلمات_مثبت";
pub const NEGATIVE_KEYWORDS: &str = "کلمات_منفی";
pub const RISKS: &str = "ریسک_ها";
pub const MISSED_PARAMETERS: &str = "پارامترهای_رعایت_نشده";
pub const COMMON_MISTAKES: &str = "اشتباهات_رایج";

pub const LIST_FIELDS: [&str; 9] = [
    STRENGTHS,
    WEAKNESSES,
    OBJECTION_LIST,
    TECHNIQUES,
    POSITIVE_KEYWORDS,
    NEGATIVE_KEYWORDS,
    RISKS,
    MISSED_PARAMETERS,
    COMMON_MISTAKES,
];

pub const TOTAL_CALLS: &str = "تعداد_کل_تماس_ها";
pub const SUCCESSFUL_CALLS: &str = "تماس_های_موفق";
pub const UNANSWERED_CALLS: &str = "تماس_های_بی_پاسخ";
pub const REFERRED_CALLS: &str = "تماس_های_ارجاعی";
pub const ACTIVE_USERS: &str = "کاربران_فعال";
pub const TOP_CUSTOMERS: &str = "مشتریان_پرتماس";
pub const CALL_TYPES: &str = "انواع_تماس";

pub const CALL_COUNT_FIELDS: [&str; 4] = [
    TOTAL_CALLS,
    SUCCESSFUL_CALLS,
    UNANSWERED_CALLS,
    REFERRED_CALLS,
];

pub const BEST_SELLER: &str = "بهترین_فروشنده";
pub const BEST_CUSTOMER: &str = "بهترین_مشتری";

pub const NAME: &str = "نام";
pub const REASON: &str = "دلیل";
pub const CALL_COUNT: &str = "تعداد_تماس";
pub const COUNT: &str = "تعداد";
pub const PERFORMANCE_NOTE: &str = "یادداشت_عملکرد";
pub const INTERACTION_QUALITY: &str = "کیفیت_تعامل";
