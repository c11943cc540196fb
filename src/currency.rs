//! The supported currencies and formatting of amounts for display.

use numfmt::{Formatter, Precision};
use serde::Serialize;

use crate::Error;

/// A currency the user can choose to display amounts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Currency {
    /// ISO 4217 code, e.g. "USD".
    pub code: &'static str,
    /// English name of the currency.
    pub name: &'static str,
    /// The symbol placed in front of amounts.
    pub symbol: &'static str,
    /// Number of decimal places in the currency's minor unit.
    pub minor_units: u8,
}

/// The currencies offered in the currency selector.
pub const CURRENCIES: [Currency; 8] = [
    Currency::new("USD", "US Dollar", "$", 2),
    Currency::new("EUR", "Euro", "€", 2),
    Currency::new("GBP", "British Pound", "£", 2),
    Currency::new("JPY", "Japanese Yen", "¥", 0),
    Currency::new("AUD", "Australian Dollar", "A$", 2),
    Currency::new("CAD", "Canadian Dollar", "C$", 2),
    Currency::new("INR", "Indian Rupee", "₹", 2),
    Currency::new("CNY", "Chinese Yuan", "¥", 2),
];

/// The currency used until the user picks another one.
pub const DEFAULT_CURRENCY: Currency = CURRENCIES[0];

impl Currency {
    const fn new(
        code: &'static str,
        name: &'static str,
        symbol: &'static str,
        minor_units: u8,
    ) -> Self {
        Self {
            code,
            name,
            symbol,
            minor_units,
        }
    }

    /// Look up a supported currency by its code.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCurrency] if `code` is not one of [CURRENCIES].
    pub fn from_code(code: &str) -> Result<Self, Error> {
        find_currency(code).ok_or_else(|| Error::InvalidCurrency(code.to_owned()))
    }

    /// Format `amount` with this currency's symbol, rounded to its minor unit.
    pub fn format(&self, amount: f64) -> String {
        format_number(amount, self.symbol, self.minor_units)
    }
}

/// Find a supported currency, ignoring the case of `code`.
pub fn find_currency(code: &str) -> Option<Currency> {
    CURRENCIES
        .iter()
        .find(|currency| currency.code.eq_ignore_ascii_case(code.trim()))
        .copied()
}

/// Format `amount` for display in the currency identified by `currency_code`.
///
/// Codes that are not in [CURRENCIES] are formatted as a plain number with
/// two decimal places followed by the raw code, e.g. "1,234.50 XYZ".
pub fn format_amount(amount: f64, currency_code: &str) -> String {
    match find_currency(currency_code) {
        Some(currency) => currency.format(amount),
        None => format!("{} {}", format_number(amount, "", 2), currency_code),
    }
}

/// numfmt switches to scientific notation from here on.
const NUMFMT_LIMIT: f64 = 1e15;

fn format_number(amount: f64, symbol: &str, decimals: u8) -> String {
    if !amount.is_finite() {
        tracing::warn!("Cannot format non-finite amount {amount}");
        return format!("{symbol}{amount}");
    }

    let scale = 10f64.powi(decimals as i32);
    let rounded = (amount * scale).round() / scale;

    if rounded == 0.0 {
        // numfmt renders zero as "0" regardless of precision
        return pad_minor_units(format!("{symbol}0"), decimals);
    }

    let prefix = if rounded < 0.0 {
        format!("-{symbol}")
    } else {
        symbol.to_owned()
    };

    if rounded.abs() >= NUMFMT_LIMIT {
        return format!(
            "{prefix}{}",
            group_thousands(&format!("{:.*}", decimals as usize, rounded.abs()))
        );
    }

    let formatted = match Formatter::currency(&prefix) {
        Ok(formatter) => formatter
            .precision(Precision::Decimals(decimals))
            .fmt_string(rounded.abs()),
        Err(error) => {
            tracing::warn!("Could not create formatter for prefix \"{prefix}\": {error:?}");
            format!("{prefix}{:.*}", decimals as usize, rounded.abs())
        }
    };

    pad_minor_units(formatted, decimals)
}

/// Insert a comma between every group of three integer digits of `number`,
/// e.g. "1234567.50" becomes "1,234,567.50".
fn group_thousands(number: &str) -> String {
    let (integer, fraction) = match number.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (number, None),
    };

    let mut grouped = String::with_capacity(number.len() + integer.len() / 3);

    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }

        grouped.push(digit);
    }

    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    grouped
}

/// numfmt drops trailing zeros in the fraction, e.g. "12.30" is rendered as
/// "12.3", so the fraction is padded back out to `decimals` digits.
fn pad_minor_units(mut formatted: String, decimals: u8) -> String {
    let decimals = decimals as usize;

    if decimals == 0 {
        if let Some(point) = formatted.find('.') {
            formatted.truncate(point);
        }

        return formatted;
    }

    let fraction_len = match formatted.rsplit_once('.') {
        Some((_, fraction)) => fraction.len(),
        None => {
            formatted.push('.');
            0
        }
    };

    for _ in fraction_len..decimals {
        formatted.push('0');
    }

    formatted
}
