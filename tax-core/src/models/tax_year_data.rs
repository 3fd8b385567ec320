use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TaxBracket;

/// Bracket schedule for a single tax year, as served by the upstream
/// tax-data service.
///
/// Brackets are ordered ascending by `min`. Once fetched the data is never
/// mutated; callers share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearData {
    #[serde(rename = "tax_brackets")]
    pub brackets: Vec<TaxBracket>,
}

impl TaxYearData {
    pub fn new(brackets: Vec<TaxBracket>) -> Self {
        Self { brackets }
    }
}

impl fmt::Display for TaxYearData {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "{:>14}  {:>14}  {:>8}", "min", "max", "rate")?;
        for bracket in &self.brackets {
            let max = bracket
                .max
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string());
            let rate = (bracket.rate * Decimal::ONE_HUNDRED).normalize().to_string();
            writeln!(f, "{:>14}  {:>14}  {:>7}%", bracket.min.to_string(), max, rate)?;
        }
        Ok(())
    }
}
