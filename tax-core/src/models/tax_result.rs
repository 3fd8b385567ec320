use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

/// Tax owed within one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdownEntry {
    #[serde(serialize_with = "as_number")]
    pub min: Decimal,
    #[serde(
        default,
        serialize_with = "as_optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max: Option<Decimal>,
    /// Rounded to cents.
    #[serde(serialize_with = "as_number")]
    pub tax_paid: Decimal,
}

/// Outcome of a progressive tax computation.
///
/// Amounts serialize as JSON numbers rather than the string form `Decimal`
/// uses by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    #[serde(serialize_with = "as_number")]
    pub total_tax: Decimal,
    pub tax_details: Vec<TaxBreakdownEntry>,
    /// Percentage, rounded to two places.
    #[serde(serialize_with = "as_number")]
    pub effective_rate: Decimal,
}

// Parsed from the decimal string so the emitted f64 is the one nearest the
// decimal value.
fn as_number<S>(
    value: &Decimal,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let number: f64 = value
        .to_string()
        .parse()
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_f64(number)
}

fn as_optional_number<S>(
    value: &Option<Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(value) => as_number(value, serializer),
        None => serializer.serialize_none(),
    }
}
