//! Marginal-rate tax computation over an ordered bracket schedule.
//!
//! Each bracket taxes only the slice of income that falls inside it. The
//! per-bracket amounts are summed unrounded; rounding to cents happens only
//! where a figure is reported (each breakdown entry, the total, and the
//! effective rate).
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{TaxBracket, TaxYearData, compute_tax};
//!
//! let data = TaxYearData::new(vec![
//!     TaxBracket { min: dec!(0), max: Some(dec!(50197)), rate: dec!(0.15) },
//!     TaxBracket { min: dec!(50197), max: None, rate: dec!(0.2) },
//! ]);
//!
//! let result = compute_tax(dec!(145000), &data);
//!
//! assert_eq!(result.total_tax, dec!(26490.15));
//! assert_eq!(result.tax_details.len(), 2);
//! assert_eq!(result.effective_rate, dec!(18.27));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{min, round_half_up};
use crate::models::{TaxBracket, TaxBreakdownEntry, TaxResult, TaxYearData};

/// Computes tax owed on `income` under the brackets in `tax_data`.
///
/// Shorthand for `TaxCalculator::new(tax_data).calculate(income)`.
pub fn compute_tax(
    income: Decimal,
    tax_data: &TaxYearData,
) -> TaxResult {
    TaxCalculator::new(tax_data).calculate(income)
}

/// Calculator bound to one year's bracket schedule.
///
/// Borrows the schedule; never mutates it.
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    tax_data: &'a TaxYearData,
}

impl<'a> TaxCalculator<'a> {
    /// Creates a calculator over `tax_data`.
    ///
    /// Brackets are expected in ascending order of `min`, with only the last
    /// one open-ended. The calculator does not check this.
    pub fn new(tax_data: &'a TaxYearData) -> Self {
        Self { tax_data }
    }

    /// Calculates total tax, the per-bracket breakdown and the effective rate.
    ///
    /// Income at or below zero yields a zero total, no breakdown entries and
    /// an effective rate of exactly zero.
    pub fn calculate(
        &self,
        income: Decimal,
    ) -> TaxResult {
        let mut running_total = Decimal::ZERO;
        let mut tax_details = Vec::new();

        for bracket in &self.tax_data.brackets {
            let Some(taxable) = self.taxable_slice(bracket, income) else {
                continue;
            };

            let tax = taxable * bracket.rate;
            running_total += tax;

            tax_details.push(TaxBreakdownEntry {
                min: bracket.min,
                max: bracket.max,
                tax_paid: round_half_up(tax),
            });
        }

        TaxResult {
            total_tax: round_half_up(running_total),
            tax_details,
            effective_rate: self.effective_rate(running_total, income),
        }
    }

    /// Portion of `income` that falls inside `bracket`, or `None` when the
    /// income does not reach past the bracket floor.
    fn taxable_slice(
        &self,
        bracket: &TaxBracket,
        income: Decimal,
    ) -> Option<Decimal> {
        if income <= bracket.min {
            return None;
        }

        let ceiling = match bracket.max {
            Some(max) => min(income, max),
            None => income,
        };

        Some(ceiling - bracket.min)
    }

    /// Total tax as a percentage of income, using the unrounded total.
    fn effective_rate(
        &self,
        total_tax: Decimal,
        income: Decimal,
    ) -> Decimal {
        if income <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        round_half_up(total_tax / income * Decimal::ONE_HUNDRED)
    }
}
