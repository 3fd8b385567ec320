mod tax_bracket;
mod tax_result;
mod tax_year_data;

pub use tax_bracket::TaxBracket;
pub use tax_result::{TaxBreakdownEntry, TaxResult};
pub use tax_year_data::TaxYearData;
