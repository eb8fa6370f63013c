//! Locale-specific (pt-BR) numeric normalization

mod parser;
mod format;

pub use parser::{parse_currency, parse_percentage, parse_period};
pub use format::{format_money, format_rate_percent};
