//! Progressive income tax calculations.
//!
//! [`progressive`] walks a year's bracket schedule and produces the total,
//! the per-bracket breakdown and the effective rate. [`common`] holds the
//! rounding helpers shared by the calculation code.

pub mod common;
pub mod progressive;

pub use progressive::{TaxCalculator, compute_tax};
