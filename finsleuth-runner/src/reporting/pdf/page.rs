//! Layout of one ticker's page.

use super::canvas::{Canvas, Font, Link};
use super::chart::{macd_chart, price_chart, ChartError, Frame};
use crate::reporting::format::{
    dollars, fixed, percent, ATR_URL, BOLLINGER_URL, MACD_URL, ROC_URL, RSI_URL, SHARPE_NOTE,
    SHARPE_URL, VOLATILITY_URL,
};
use finsleuth_core::analysis::IndicatorResult;
use lopdf::content::Operation;

/// A4 portrait, in points.
pub const PAGE_WIDTH: f64 = 595.0;
pub const PAGE_HEIGHT: f64 = 842.0;

const MARGIN: f64 = 40.0;
const ROW_HEIGHT: f64 = 16.0;
const BODY_SIZE: f64 = 10.0;

/// Everything needed to place one page in the document.
#[derive(Debug)]
pub struct RenderedPage {
    pub ticker: String,
    pub operations: Vec<Operation>,
    pub links: Vec<Link>,
    pub chart_error: Option<ChartError>,
}

/// A table cell: plain label, linked label, or value.
enum Cell<'a> {
    Label(&'a str),
    Linked(&'a str, &'a str),
    Value(String),
}

fn draw_row(canvas: &mut Canvas, y: f64, columns: &[f64], cells: Vec<Cell<'_>>) {
    for (x, cell) in columns.iter().zip(cells) {
        match cell {
            Cell::Label(text) => canvas.text(Font::Regular, BODY_SIZE, *x, y, text),
            Cell::Linked(text, url) => canvas.link_text(BODY_SIZE, *x, y, text, url),
            Cell::Value(text) => canvas.text(Font::Regular, BODY_SIZE, *x, y, &text),
        }
    }
}

fn section_heading(canvas: &mut Canvas, y: f64, text: &str) {
    canvas.text(Font::Bold, 12.0, MARGIN, y, text);
}

/// Render one ticker's page. A chart failure is noted on the page, never fatal.
pub fn render_page(ticker: &str, r: &IndicatorResult) -> RenderedPage {
    let mut canvas = Canvas::new();
    let mut y = PAGE_HEIGHT - 50.0;

    canvas.text_centered(
        Font::Bold,
        16.0,
        PAGE_WIDTH / 2.0,
        y,
        &format!("Detective's Report: {ticker}"),
    );
    y -= 16.0;
    canvas.text_centered(
        Font::Regular,
        8.0,
        PAGE_WIDTH / 2.0,
        y,
        &format!(
            "{} to {} ({} trading days)",
            r.series.first_date(),
            r.series.last_date(),
            r.bar_count()
        ),
    );

    // Key Intel
    y -= 28.0;
    section_heading(&mut canvas, y, "Key Intel:");
    let intel_cols = [MARGIN, MARGIN + 85.0, MARGIN + 283.0, MARGIN + 368.0];
    y -= ROW_HEIGHT + 2.0;
    draw_row(
        &mut canvas,
        y,
        &intel_cols,
        vec![
            Cell::Label("Price:"),
            Cell::Value(dollars(Some(r.latest_price))),
            Cell::Linked("Volatility:", VOLATILITY_URL),
            Cell::Value(fixed(r.volatility, 4)),
        ],
    );
    y -= ROW_HEIGHT;
    draw_row(
        &mut canvas,
        y,
        &intel_cols,
        vec![
            Cell::Linked("Sharpe Ratio*:", SHARPE_URL),
            Cell::Value(fixed(r.sharpe_ratio, 4)),
            Cell::Linked("ATR:", ATR_URL),
            Cell::Value(fixed(r.atr, 4)),
        ],
    );
    y -= ROW_HEIGHT;
    draw_row(
        &mut canvas,
        y,
        &intel_cols,
        vec![
            Cell::Linked("Avg ROC:", ROC_URL),
            Cell::Value(percent(r.avg_roc)),
            Cell::Label("Latest ROC:"),
            Cell::Value(percent(r.latest_roc)),
        ],
    );

    // Momentum Signals
    y -= 26.0;
    section_heading(&mut canvas, y, "Momentum Signals:");
    let momentum_cols = [MARGIN, MARGIN + 85.0, MARGIN + 283.0, MARGIN + 425.0];
    y -= ROW_HEIGHT + 2.0;
    draw_row(
        &mut canvas,
        y,
        &momentum_cols,
        vec![
            Cell::Linked("RSI:", RSI_URL),
            Cell::Value(fixed(r.rsi, 2)),
            Cell::Linked("MACD:", MACD_URL),
            Cell::Value(fixed(r.macd, 4)),
        ],
    );
    y -= ROW_HEIGHT;
    draw_row(
        &mut canvas,
        y,
        &momentum_cols,
        vec![
            Cell::Label("MACD Signal:"),
            Cell::Value(fixed(r.macd_signal, 4)),
            Cell::Linked("Bollinger Bands", BOLLINGER_URL),
            Cell::Value(format!("Avg Gap: {}", dollars(r.avg_bb_gap))),
        ],
    );

    // Charts fill the rest of the page above the footnote.
    let chart_width = PAGE_WIDTH - MARGIN * 2.0 - 10.0;
    let chart_x = MARGIN + 10.0;
    let price_frame = Frame {
        x: chart_x,
        y: 270.0,
        width: chart_width,
        height: y - 40.0 - 270.0,
    };
    let macd_frame = Frame {
        x: chart_x,
        y: 80.0,
        width: chart_width,
        height: 150.0,
    };

    let chart_error = price_chart(&mut canvas, price_frame, ticker, r)
        .and_then(|()| macd_chart(&mut canvas, macd_frame, ticker, r))
        .err();
    if let Some(e) = &chart_error {
        tracing::error!(ticker, stage = "report", error = %e, "chart generation failed");
        canvas.text(
            Font::Regular,
            BODY_SIZE,
            MARGIN,
            y - 40.0,
            &format!("Error generating charts: {e}"),
        );
    }

    canvas.text(Font::Oblique, 7.0, MARGIN, 40.0, SHARPE_NOTE);

    let (operations, links) = canvas.into_parts();
    RenderedPage {
        ticker: ticker.to_string(),
        operations,
        links,
        chart_error,
    }
}
