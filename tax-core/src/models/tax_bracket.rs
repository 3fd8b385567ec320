use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One marginal-rate band of a progressive schedule.
///
/// `max` is `None` only for the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
    pub rate: Decimal,
}
