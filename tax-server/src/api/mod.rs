//! HTTP handlers.

mod calculate;
mod error;

pub use calculate::{CalculateTaxQuery, calculate_tax};
pub use error::{ApiError, panic_response};
