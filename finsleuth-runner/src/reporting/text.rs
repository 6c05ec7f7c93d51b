//! Plain-text case file.

use super::format::{
    dollars, fixed, percent, ATR_URL, BOLLINGER_URL, MACD_URL, ROC_URL, RSI_URL, SHARPE_URL,
    VOLATILITY_URL,
};
use finsleuth_core::analysis::{AnalysisSet, IndicatorResult};
use std::fmt::Write;

pub const TITLE: &str = "Financial Detective Agency: Case File";

/// Render the whole case file: title, then one block per ticker in set order.
pub fn render_text(set: &AnalysisSet) -> String {
    let mut out = String::with_capacity(128 + set.len() * 768);
    out.push_str(TITLE);
    out.push_str("\n\n");
    for (ticker, result) in set.iter() {
        render_block(&mut out, ticker, result);
    }
    out
}

fn render_block(out: &mut String, ticker: &str, r: &IndicatorResult) {
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "Stock: {ticker}\n\
         Latest Price: {}\n\
         Volatility: {} ({VOLATILITY_URL})\n\
         Sharpe Ratio: {} ({SHARPE_URL})\n\
         Average True Range (ATR): {} ({ATR_URL})\n\
         Average Rate of Change (ROC): {} ({ROC_URL})\n\
         Latest Rate of Change (ROC): {}\n\
         RSI: {} ({RSI_URL})\n\
         MACD: {} ({MACD_URL})\n\
         MACD Signal: {}\n\
         Average Bollinger Bands Gap: {} ({BOLLINGER_URL})\n\n",
        dollars(Some(r.latest_price)),
        fixed(r.volatility, 4),
        fixed(r.sharpe_ratio, 4),
        fixed(r.atr, 4),
        percent(r.avg_roc),
        percent(r.latest_roc),
        fixed(r.rsi, 2),
        fixed(r.macd, 4),
        fixed(r.macd_signal, 4),
        dollars(r.avg_bb_gap),
    );
}
