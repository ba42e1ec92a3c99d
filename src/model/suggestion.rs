use crate::model::Amount;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A structured postage recommendation for a free-text mailing need.
///
/// Every field is required when deserializing; a payload missing any of them is rejected as a
/// whole rather than accepted as a partial suggestion.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Suggestion {
    /// Type of mail (e.g. Local Letter, Air Mail).
    pub category: String,
    /// Estimated weight tier.
    pub weight: String,
    /// Postage cost in the local currency.
    #[schemars(with = "f64")]
    pub price: Amount,
    /// Short explanation of the rate.
    pub description: String,
    /// Pro tips for mailing.
    pub tips: Vec<String>,
}
