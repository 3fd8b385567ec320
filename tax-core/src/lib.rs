pub mod calculations;
pub mod models;

pub use calculations::{TaxCalculator, compute_tax};
pub use models::*;
