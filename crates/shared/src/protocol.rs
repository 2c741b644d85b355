//! Wire schemas for advice backend responses.
//!
//! The backend gives no guarantee about which fields are present, so every
//! field is optional and missing or `null` values deserialize to `None`.
//! A field of the wrong shape is dropped on its own rather than failing the
//! whole response, and list items of the wrong shape are skipped.
//! Leaf values use [`Scalar`] because the backend is loose about whether
//! amounts arrive as numbers or strings.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(v) => v.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{v:.0}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Decodes an optional field, turning a value of the wrong shape into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

/// Decodes an optional list, keeping only the items that fit `T`. Anything
/// other than an array becomes `None`.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStrategyResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub advice: Option<FinancialAdvice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAdvice {
    #[serde(default, deserialize_with = "lenient")]
    pub optimization_strategy: Option<OptimizationStrategy>,
    #[serde(default, deserialize_with = "lenient")]
    pub potential_savings: Option<PotentialSavings>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub action_steps: Option<Vec<Scalar>>,
    #[serde(default, deserialize_with = "lenient")]
    pub risk_assessment: Option<RiskAssessment>,
    #[serde(default, deserialize_with = "lenient")]
    pub suggestions: Option<ScenarioList>,
    #[serde(default, deserialize_with = "lenient")]
    pub contextual_recommendations: Option<ScenarioList>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationStrategy {
    #[serde(default, deserialize_with = "lenient")]
    pub primary_method: Option<PaymentMethodAdvice>,
    #[serde(default, deserialize_with = "lenient")]
    pub secondary_method: Option<PaymentMethodAdvice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodAdvice {
    #[serde(default, deserialize_with = "lenient")]
    pub platform: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub percentage: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub bank_details: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub advantages: Option<Vec<Scalar>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialSavings {
    #[serde(default, deserialize_with = "lenient")]
    pub total: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub breakdown: Option<Vec<Scalar>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    #[serde(default, deserialize_with = "lenient")]
    pub credit_score_impact: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub financial_risks: Option<Vec<Scalar>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioList {
    #[serde(default, deserialize_with = "lenient_list")]
    pub specific_scenario: Option<Vec<Scalar>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAdviceResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub advice: Option<ProductAdvice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAdvice {
    #[serde(default, deserialize_with = "lenient")]
    pub product_recommendations: Option<ProductRecommendations>,
    #[serde(default, deserialize_with = "lenient")]
    pub financial_analysis: Option<FinancialAnalysis>,
    #[serde(default, deserialize_with = "lenient")]
    pub market_insights: Option<MarketInsights>,
    #[serde(default, deserialize_with = "lenient")]
    pub financial_advice: Option<FinancialAdviceNotes>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecommendations {
    #[serde(default, deserialize_with = "lenient")]
    pub primary_choice: Option<ProductChoice>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub alternatives: Option<Vec<ProductChoice>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChoice {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub specifications: Option<Vec<Scalar>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub reasons_to_buy: Option<Vec<Scalar>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub key_differences: Option<Vec<Scalar>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAnalysis {
    #[serde(default, deserialize_with = "lenient")]
    pub affordability_score: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub monthly_impact: Option<MonthlyImpact>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub savings_suggestions: Option<Vec<Scalar>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub budgeting_tips: Option<Vec<Scalar>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyImpact {
    /// Fraction of monthly income, `0.25` meaning 25%.
    #[serde(default, deserialize_with = "lenient")]
    pub percentage: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub sustainability_period: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInsights {
    #[serde(default, deserialize_with = "lenient")]
    pub price_history: Option<PriceHistory>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub future_considerations: Option<Vec<Scalar>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistory {
    #[serde(default, deserialize_with = "lenient")]
    pub trend: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub best_time_to_buy: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAdviceNotes {
    #[serde(default, deserialize_with = "lenient_list")]
    pub immediate_steps: Option<Vec<Scalar>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub risks_to_consider: Option<Vec<Scalar>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfAdviceResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }
}
