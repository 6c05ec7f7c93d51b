//! Minimal drawing surface over PDF content-stream operators.
//!
//! Coordinates are PDF points with the origin at the bottom-left of the page.

use lopdf::content::Operation;
use lopdf::Object;

/// Standard fonts registered on every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
        }
    }

    pub const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Oblique];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f64, pub f64, pub f64);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const GREY: Rgb = Rgb(0.6, 0.6, 0.6);
    pub const LINK_BLUE: Rgb = Rgb(0.0, 0.0, 1.0);
    pub const NAVY: Rgb = Rgb(0.12, 0.28, 0.59);
    pub const ORANGE: Rgb = Rgb(0.93, 0.49, 0.13);
    pub const GREEN: Rgb = Rgb(0.17, 0.63, 0.17);
    pub const RED: Rgb = Rgb(0.84, 0.15, 0.16);
    pub const PURPLE: Rgb = Rgb(0.5, 0.0, 0.5);
    pub const TEAL: Rgb = Rgb(0.2, 0.6, 0.6);
}

/// A clickable URI region.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub rect: [f64; 4],
    pub url: String,
}

pub(crate) fn real(v: f64) -> Object {
    Object::Real((v as f32).into())
}

/// Approximate Helvetica advance width. Good enough for centering and underlines.
pub fn text_width(text: &str, size: f64) -> f64 {
    let em: f64 = text
        .chars()
        .map(|c| match c {
            'i' | 'j' | 'l' | '\'' | '.' | ',' | ':' | ';' | '!' | '|' => 0.25,
            'f' | 't' | 'r' | 'I' | ' ' | '(' | ')' | '/' | '-' => 0.32,
            'm' | 'w' | 'M' | 'W' => 0.85,
            c if c.is_ascii_uppercase() => 0.68,
            _ => 0.55,
        })
        .sum();
    em * size
}

#[derive(Debug, Default)]
pub struct Canvas {
    ops: Vec<Operation>,
    links: Vec<Link>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_parts(self) -> (Vec<Operation>, Vec<Link>) {
        (self.ops, self.links)
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    pub fn save(&mut self) {
        self.op("q", vec![]);
    }

    pub fn restore(&mut self) {
        self.op("Q", vec![]);
    }

    pub fn fill_color(&mut self, c: Rgb) {
        self.op("rg", vec![real(c.0), real(c.1), real(c.2)]);
    }

    pub fn stroke_color(&mut self, c: Rgb) {
        self.op("RG", vec![real(c.0), real(c.1), real(c.2)]);
    }

    pub fn line_width(&mut self, w: f64) {
        self.op("w", vec![real(w)]);
    }

    pub fn dash(&mut self, on: f64, off: f64) {
        self.op("d", vec![Object::Array(vec![real(on), real(off)]), 0.into()]);
    }

    pub fn solid(&mut self) {
        self.op("d", vec![Object::Array(vec![]), 0.into()]);
    }

    pub fn text(&mut self, font: Font, size: f64, x: f64, y: f64, text: &str) {
        self.op("BT", vec![]);
        self.op("Tf", vec![font.resource_name().into(), real(size)]);
        self.op("Td", vec![real(x), real(y)]);
        self.op("Tj", vec![Object::string_literal(text)]);
        self.op("ET", vec![]);
    }

    pub fn text_centered(&mut self, font: Font, size: f64, center_x: f64, y: f64, text: &str) {
        let x = center_x - text_width(text, size) / 2.0;
        self.text(font, size, x, y, text);
    }

    /// Blue underlined text with a URI annotation over it.
    pub fn link_text(&mut self, size: f64, x: f64, y: f64, text: &str, url: &str) {
        let width = text_width(text, size);
        self.save();
        self.fill_color(Rgb::LINK_BLUE);
        self.stroke_color(Rgb::LINK_BLUE);
        self.text(Font::Regular, size, x, y, text);
        self.line_width(0.5);
        self.line(x, y - 1.5, x + width, y - 1.5);
        self.restore();
        self.links.push(Link {
            rect: [x, y - 3.0, x + width, y + size],
            url: url.to_string(),
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.op("m", vec![real(x1), real(y1)]);
        self.op("l", vec![real(x2), real(y2)]);
        self.op("S", vec![]);
    }

    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.op("re", vec![real(x), real(y), real(w), real(h)]);
        self.op("S", vec![]);
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.op("re", vec![real(x), real(y), real(w), real(h)]);
        self.op("f", vec![]);
    }

    /// Stroke a polyline, breaking it wherever a point is missing.
    pub fn polyline(&mut self, points: impl IntoIterator<Item = Option<(f64, f64)>>) {
        let mut pen_down = false;
        let mut drew = false;
        for point in points {
            match point {
                Some((x, y)) if pen_down => self.op("l", vec![real(x), real(y)]),
                Some((x, y)) => {
                    self.op("m", vec![real(x), real(y)]);
                    pen_down = true;
                    drew = true;
                }
                None => pen_down = false,
            }
        }
        if drew {
            self.op("S", vec![]);
        }
    }
}
