//! Vector charts drawn straight into the page content stream.
//!
//! Two figures per ticker: close price with Bollinger Bands over an RSI panel,
//! and MACD with its signal line and histogram.

use super::canvas::{Canvas, Font, Rgb};
use finsleuth_core::analysis::IndicatorResult;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("need at least 2 data points to plot, found {0}")]
    TooFewPoints(usize),

    #[error("'{0}' has no finite values to plot")]
    NothingToPlot(&'static str),
}

/// Rectangle on the page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    fn split_top(self, top_share: f64, gap: f64) -> (Frame, Frame) {
        let top_h = (self.height - gap) * top_share;
        let bottom_h = self.height - gap - top_h;
        let top = Frame {
            y: self.y + bottom_h + gap,
            height: top_h,
            ..self
        };
        let bottom = Frame {
            height: bottom_h,
            ..self
        };
        (top, bottom)
    }
}

struct Line<'a> {
    label: &'a str,
    values: &'a [f64],
    color: Rgb,
    dashed: bool,
}

/// Maps bar index and value into a frame.
struct Scale {
    frame: Frame,
    n: usize,
    lo: f64,
    hi: f64,
}

impl Scale {
    fn new(frame: Frame, n: usize, lo: f64, hi: f64) -> Self {
        // A flat series still gets a visible band.
        let (lo, hi) = if hi - lo < 1e-12 {
            let pad = if lo.abs() > 1e-12 { lo.abs() * 0.01 } else { 1.0 };
            (lo - pad, hi + pad)
        } else {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        };
        Self { frame, n, lo, hi }
    }

    fn fixed(frame: Frame, n: usize, lo: f64, hi: f64) -> Self {
        Self { frame, n, lo, hi }
    }

    fn x(&self, i: usize) -> f64 {
        let steps = (self.n.max(2) - 1) as f64;
        self.frame.x + self.frame.width * i as f64 / steps
    }

    fn y(&self, v: f64) -> f64 {
        self.frame.y + self.frame.height * (v - self.lo) / (self.hi - self.lo)
    }

    fn point(&self, i: usize, v: f64) -> Option<(f64, f64)> {
        v.is_finite().then(|| (self.x(i), self.y(v)))
    }
}

fn finite_range<'a>(series: impl IntoIterator<Item = &'a [f64]>) -> Option<(f64, f64)> {
    series
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn draw_axes(canvas: &mut Canvas, scale: &Scale, decimals: usize) {
    let f = scale.frame;
    canvas.save();
    canvas.stroke_color(Rgb::GREY);
    canvas.line_width(0.5);
    canvas.stroke_rect(f.x, f.y, f.width, f.height);
    canvas.fill_color(Rgb::BLACK);
    canvas.text(
        Font::Regular,
        6.0,
        f.x - 34.0,
        f.y + f.height - 6.0,
        &format!("{:.decimals$}", scale.hi),
    );
    canvas.text(Font::Regular, 6.0, f.x - 34.0, f.y, &format!("{:.decimals$}", scale.lo));
    canvas.restore();
}

fn draw_lines(canvas: &mut Canvas, scale: &Scale, lines: &[Line<'_>]) {
    for line in lines {
        canvas.save();
        canvas.stroke_color(line.color);
        canvas.line_width(0.8);
        if line.dashed {
            canvas.dash(3.0, 2.0);
        }
        canvas.polyline(
            line.values
                .iter()
                .enumerate()
                .map(|(i, &v)| scale.point(i, v)),
        );
        canvas.restore();
    }
}

fn draw_legend(canvas: &mut Canvas, frame: Frame, lines: &[Line<'_>]) {
    let mut x = frame.x + 4.0;
    let y = frame.y + frame.height - 9.0;
    for line in lines {
        canvas.save();
        canvas.stroke_color(line.color);
        canvas.line_width(1.2);
        canvas.line(x, y + 2.5, x + 10.0, y + 2.5);
        canvas.fill_color(Rgb::BLACK);
        canvas.text(Font::Regular, 6.0, x + 13.0, y, line.label);
        canvas.restore();
        x += 22.0 + super::canvas::text_width(line.label, 6.0);
    }
}

fn title(canvas: &mut Canvas, frame: Frame, text: &str) {
    canvas.text_centered(
        Font::Bold,
        9.0,
        frame.x + frame.width / 2.0,
        frame.y + frame.height + 4.0,
        text,
    );
}

fn date_labels(canvas: &mut Canvas, frame: Frame, result: &IndicatorResult) {
    let series = &result.series;
    let first = series.first_date().to_string();
    let last = series.last_date().to_string();
    canvas.text(Font::Regular, 6.0, frame.x, frame.y - 8.0, &first);
    canvas.text(
        Font::Regular,
        6.0,
        frame.x + frame.width - super::canvas::text_width(&last, 6.0),
        frame.y - 8.0,
        &last,
    );
}

fn ensure_plottable(n: usize) -> Result<(), ChartError> {
    if n < 2 {
        return Err(ChartError::TooFewPoints(n));
    }
    Ok(())
}

/// Close with Bollinger Bands (top two thirds) over RSI with 30/70 guides.
pub fn price_chart(
    canvas: &mut Canvas,
    frame: Frame,
    ticker: &str,
    result: &IndicatorResult,
) -> Result<(), ChartError> {
    let closes = result.closes();
    let n = closes.len();
    ensure_plottable(n)?;

    let h = &result.history;
    let (price_frame, rsi_frame) = frame.split_top(2.0 / 3.0, 8.0);

    let price_lines = [
        Line {
            label: "Close Price",
            values: &closes,
            color: Rgb::NAVY,
            dashed: false,
        },
        Line {
            label: "Upper BB",
            values: &h.upper_band,
            color: Rgb::ORANGE,
            dashed: true,
        },
        Line {
            label: "Lower BB",
            values: &h.lower_band,
            color: Rgb::GREEN,
            dashed: true,
        },
    ];
    let (lo, hi) = finite_range(price_lines.iter().map(|l| l.values))
        .ok_or(ChartError::NothingToPlot("Close Price"))?;
    let price_scale = Scale::new(price_frame, n, lo, hi);

    title(canvas, price_frame, &format!("{ticker} Price with Bollinger Bands"));
    draw_axes(canvas, &price_scale, 2);
    draw_lines(canvas, &price_scale, &price_lines);
    draw_legend(canvas, price_frame, &price_lines);

    let rsi_scale = Scale::fixed(rsi_frame, n, 0.0, 100.0);
    draw_axes(canvas, &rsi_scale, 0);
    canvas.save();
    canvas.line_width(0.5);
    canvas.dash(2.0, 2.0);
    canvas.stroke_color(Rgb::RED);
    canvas.line(rsi_frame.x, rsi_scale.y(70.0), rsi_frame.x + rsi_frame.width, rsi_scale.y(70.0));
    canvas.stroke_color(Rgb::GREEN);
    canvas.line(rsi_frame.x, rsi_scale.y(30.0), rsi_frame.x + rsi_frame.width, rsi_scale.y(30.0));
    canvas.restore();

    let rsi_lines = [Line {
        label: "RSI",
        values: &h.rsi,
        color: Rgb::PURPLE,
        dashed: false,
    }];
    draw_lines(canvas, &rsi_scale, &rsi_lines);
    draw_legend(canvas, rsi_frame, &rsi_lines);
    date_labels(canvas, rsi_frame, result);
    Ok(())
}

/// MACD and signal lines over a histogram of their difference.
pub fn macd_chart(
    canvas: &mut Canvas,
    frame: Frame,
    ticker: &str,
    result: &IndicatorResult,
) -> Result<(), ChartError> {
    let h = &result.history;
    let n = h.macd.len();
    ensure_plottable(n)?;

    let lines = [
        Line {
            label: "MACD",
            values: &h.macd,
            color: Rgb::NAVY,
            dashed: false,
        },
        Line {
            label: "Signal",
            values: &h.macd_signal,
            color: Rgb::ORANGE,
            dashed: false,
        },
    ];
    let (lo, hi) = finite_range(
        lines
            .iter()
            .map(|l| l.values)
            .chain(std::iter::once(h.macd_histogram.as_slice())),
    )
    .ok_or(ChartError::NothingToPlot("MACD"))?;
    // Keep zero in view so histogram bars have a baseline.
    let scale = Scale::new(frame, n, lo.min(0.0), hi.max(0.0));

    title(canvas, frame, &format!("{ticker} MACD"));
    draw_axes(canvas, &scale, 4);

    let zero = scale.y(0.0);
    let bar_w = (frame.width / n as f64 * 0.7).max(0.3);
    canvas.save();
    canvas.fill_color(Rgb::TEAL);
    for (i, &v) in h.macd_histogram.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        let top = scale.y(v);
        canvas.fill_rect(scale.x(i) - bar_w / 2.0, zero.min(top), bar_w, (top - zero).abs());
    }
    canvas.restore();

    draw_lines(canvas, &scale, &lines);
    draw_legend(canvas, frame, &lines);
    date_labels(canvas, frame, result);
    Ok(())
}
