use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a query value cannot be used as a number.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("value is empty")]
    Empty,

    #[error("invalid number '{0}'")]
    Invalid(String),
}

/// Normalizes input for parsing: trims whitespace and removes commas (thousands separator).
fn normalize_number_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a query value into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`) and scientific
/// notation (e.g. `"1.45e5"`). Empty or whitespace-only input is an error.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParamError> {
    let normalized = normalize_number_input(s);
    if normalized.is_empty() {
        return Err(ParamError::Empty);
    }

    let parsed = if normalized.contains(['e', 'E']) {
        Decimal::from_scientific(&normalized)
    } else {
        normalized.parse()
    };

    parsed.map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParamError::Invalid(s.to_string())
    })
}

/// Parses a query value into a tax year.
pub fn parse_year(s: &str) -> Result<i32, ParamError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ParamError::Empty);
    }
    trimmed
        .parse()
        .map_err(|_| ParamError::Invalid(s.to_string()))
}

/// Renders years as `"2021, 2022, 2023"`.
pub fn join_years<'a>(years: impl IntoIterator<Item = &'a i32>) -> String {
    years
        .into_iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
