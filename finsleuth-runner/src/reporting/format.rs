//! Number formatting and indicator reference links shared by both report formats.

/// Rendered in place of an undefined value.
pub const UNDEFINED: &str = "n/a";

pub const VOLATILITY_URL: &str = "https://www.investopedia.com/terms/v/volatility.asp";
pub const SHARPE_URL: &str = "https://www.investopedia.com/terms/s/sharperatio.asp";
pub const ATR_URL: &str = "https://www.investopedia.com/terms/a/atr.asp";
pub const ROC_URL: &str = "https://www.investopedia.com/terms/p/pricerateofchange.asp";
pub const RSI_URL: &str = "https://www.investopedia.com/terms/r/rsi.asp";
pub const MACD_URL: &str = "https://www.investopedia.com/terms/m/macd.asp";
pub const BOLLINGER_URL: &str = "https://www.investopedia.com/terms/b/bollingerbands.asp";

/// Footnote for the non-standard Sharpe annualization.
pub const SHARPE_NOTE: &str =
    "* Sharpe ratio is annualized by sqrt(number of bars in the sample), not sqrt(252).";

/// Fixed-point with `decimals` places, or `n/a`.
pub fn fixed(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => UNDEFINED.to_string(),
    }
}

/// `$X.XX`, or `n/a`.
pub fn dollars(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${v:.2}"),
        None => UNDEFINED.to_string(),
    }
}

/// `X.XX%` for a value already expressed in percent, or `n/a`.
pub fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}%"),
        None => UNDEFINED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defined_values() {
        assert_eq!(fixed(Some(0.123456), 4), "0.1235");
        assert_eq!(fixed(Some(70.0), 2), "70.00");
        assert_eq!(dollars(Some(189.5)), "$189.50");
        assert_eq!(percent(Some(-1.234)), "-1.23%");
    }

    #[test]
    fn undefined_values() {
        assert_eq!(fixed(None, 4), "n/a");
        assert_eq!(dollars(None), "n/a");
        assert_eq!(percent(None), "n/a");
    }
}
