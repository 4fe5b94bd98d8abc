//! Display formatting for money, rates and dates
//!
//! These are presentation helpers only. Stored monetary strings always come
//! from [`crate::round2`], never from the output of this module.

use crate::money::{parse_lenient, round2};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How negative amounts are marked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NegativeStyle {
    /// `-Ksh 1,234.50`
    #[default]
    LeadingMinus,
    /// `(Ksh 1,234.50)`
    Parentheses,
}

/// Currency display settings
///
/// The default matches the en-KE / KES pairing: `Ksh 1,234.50`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurrencyFormat {
    /// Printed before the number, including any spacing
    pub prefix: String,
    /// Thousands separator; empty disables grouping
    pub grouping_separator: String,
    pub decimal_separator: String,
    pub negative_style: NegativeStyle,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            prefix: "Ksh ".to_string(),
            grouping_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            negative_style: NegativeStyle::LeadingMinus,
        }
    }
}

impl CurrencyFormat {
    /// Format an amount with grouping and exactly two decimals
    ///
    /// # Example
    /// ```ignore
    /// let fmt = CurrencyFormat::default();
    /// assert_eq!(fmt.format(dec!(1234.5)), "Ksh 1,234.50");
    /// ```
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = round2(amount);
        let digits = rounded.abs().to_string();
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let body = format!(
            "{}{}{}{}",
            self.prefix,
            group_thousands(int_part, &self.grouping_separator),
            self.decimal_separator,
            frac_part
        );

        if rounded.is_sign_negative() {
            match self.negative_style {
                NegativeStyle::LeadingMinus => format!("-{body}"),
                NegativeStyle::Parentheses => format!("({body})"),
            }
        } else {
            body
        }
    }
}

/// Format with the default currency settings
pub fn format_currency(amount: Decimal) -> String {
    CurrencyFormat::default().format(amount)
}

/// Insert a separator every three digits from the right
fn group_thousands(digits: &str, sep: &str) -> String {
    if sep.is_empty() {
        return digits.to_string();
    }

    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3 * sep.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push_str(sep);
        }
        result.push(c);
    }
    result
}

/// Render a rate string for labels such as `Tax (16%)`
///
/// The rate is parsed leniently and printed without trailing zeros.
pub fn format_percent(rate: &str) -> String {
    parse_lenient(rate).normalize().to_string()
}

/// Long date form, e.g. `January 22, 2025`
pub fn format_date_long(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
