use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use rust_decimal::Decimal;
use tax_core::{TaxResult, compute_tax};

use super::ApiError;
use crate::AppState;
use crate::utils::{parse_decimal, parse_year};

/// Raw query string. Values stay strings so that a malformed number is
/// reported the same way as an absent one.
#[derive(Debug, Default)]
pub struct CalculateTaxQuery {
    pub annual_income: Option<String>,
    pub tax_year: Option<String>,
}

impl CalculateTaxQuery {
    /// Collects the known keys from decoded query pairs. A repeated key
    /// keeps its first value; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "annual_income" => &mut query.annual_income,
                "tax_year" => &mut query.tax_year,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    /// Both parameters, parsed, or `None` if either is absent or malformed.
    fn parse(&self) -> Option<(Decimal, i32)> {
        let income = parse_decimal(self.annual_income.as_deref()?).ok()?;
        let tax_year = parse_year(self.tax_year.as_deref()?).ok()?;
        Some((income, tax_year))
    }
}

/// GET /calculate-tax?annual_income=<number>&tax_year=<year>
///
/// Total tax, per-bracket breakdown and effective rate for the given income
/// under that year's brackets.
pub async fn calculate_tax(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<TaxResult>, ApiError> {
    let Ok(Query(pairs)) = query else {
        return Err(ApiError::MissingParameters);
    };
    let (income, tax_year) = CalculateTaxQuery::from_pairs(pairs)
        .parse()
        .ok_or(ApiError::MissingParameters)?;

    if !state.supported_years.contains(&tax_year) {
        tracing::debug!(tax_year, "rejected unsupported tax year");
        return Err(ApiError::UnsupportedYear(
            state.supported_years.iter().copied().collect(),
        ));
    }

    let tax_data = state.provider.fetch(tax_year).await?;
    let result = compute_tax(income, &tax_data);

    tracing::debug!(
        tax_year,
        %income,
        total_tax = %result.total_tax,
        "calculated tax"
    );

    Ok(Json(result))
}
