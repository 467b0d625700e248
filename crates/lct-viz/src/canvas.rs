//! Retained-mode SVG builder shared by every plot kind.

use std::fmt::{self, Write};

use crate::color::Color;
use crate::primitives::*;
use crate::font;
use crate::text::{self, TextMetrics};

#[derive(Debug, Clone)]
enum Shape {
    Rect { x: f64, y: f64, w: f64, h: f64, style: Style },
    Circle { cx: f64, cy: f64, r: f64, style: Style },
    Line { from: (f64, f64), to: (f64, f64), style: LineStyle },
    Polyline { points: Vec<(f64, f64)>, style: LineStyle },
    Text { at: (f64, f64), content: String, style: TextStyle, angle: Option<f64> },
    Clipped { id: String, children: Vec<Shape> },
}

/// Collects shapes in document order and serializes them with [`Canvas::finish_svg`].
///
/// Coordinates are in px with the origin at the top-left corner.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    font_family: String,
    clip_defs: Vec<String>,
    /// `layers[0]` is the document; every further layer is an open clip group.
    layers: Vec<(Option<String>, Vec<Shape>)>,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            font_family: "sans-serif".into(),
            clip_defs: Vec::new(),
            layers: vec![(None, Vec::new())],
        }
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &Style) {
        self.add(Shape::Rect { x, y, w, h, style: *style });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, style: &Style) {
        self.add(Shape::Circle { cx, cy, r, style: *style });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle) {
        self.add(Shape::Line { from: (x1, y1), to: (x2, y2), style: *style });
    }

    /// Ignored for fewer than two points.
    pub fn polyline(&mut self, points: &[(f64, f64)], style: &LineStyle) {
        if let [_, _, ..] = points {
            self.add(Shape::Polyline { points: points.to_vec(), style: *style });
        }
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        self.add(Shape::Text { at: (x, y), content: content.into(), style: *style, angle: None });
    }

    /// Text rotated by `angle` degrees about its anchor.
    pub fn text_rotated(&mut self, x: f64, y: f64, content: &str, style: &TextStyle, angle: f64) {
        self.add(Shape::Text { at: (x, y), content: content.into(), style: *style, angle: Some(angle) });
    }

    pub fn marker(&mut self, x: f64, y: f64, marker: &MarkerStyle) {
        let fill = Style::filled(marker.color);
        let s = marker.size;
        match marker.shape {
            MarkerShape::Circle => self.circle(x, y, s, &fill),
            MarkerShape::Square => self.rect(x - s, y - s, 2.0 * s, 2.0 * s, &fill),
        }
    }

    /// Start clipping to a rectangle; returns the clip id. Shapes added until
    /// [`Canvas::pop_clip`] are drawn inside it.
    pub fn push_clip(&mut self, x: f64, y: f64, w: f64, h: f64) -> String {
        let id = format!("clip{}", self.clip_defs.len());
        self.clip_defs.push(format!(
            r#"<clipPath id="{id}"><rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" /></clipPath>"#
        ));
        self.layers.push((Some(id.clone()), Vec::new()));
        id
    }

    pub fn pop_clip(&mut self) {
        if self.layers.len() > 1 {
            self.close_layer();
        }
    }

    /// Extent of `content` in the first installed face of the canvas font family.
    pub fn measure_text(&self, content: &str, style: &TextStyle) -> TextMetrics {
        match font::for_family(&self.font_family) {
            Some(fonts) => text::measure_text(fonts.select(style.bold), content, style.size),
            None => {
                let m = text::estimate_text(content, style.size);
                if style.bold { TextMetrics { width: 1.08 * m.width, ..m } } else { m }
            }
        }
    }

    fn add(&mut self, shape: Shape) {
        if let Some((_, shapes)) = self.layers.last_mut() {
            shapes.push(shape);
        }
    }

    fn close_layer(&mut self) {
        if let Some((Some(id), children)) = self.layers.pop() {
            self.add(Shape::Clipped { id, children });
        }
    }

    /// Serialize the document. Clip groups still open are closed first.
    pub fn finish_svg(&self) -> String {
        let mut doc = self.clone();
        while doc.layers.len() > 1 {
            doc.close_layer();
        }
        let mut out = String::with_capacity(32 * 1024);
        // fmt::Write for String never fails.
        let _ = doc.write_document(&mut out);
        out
    }

    fn write_document(&self, out: &mut String) -> fmt::Result {
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        )?;
        if !self.clip_defs.is_empty() {
            writeln!(out, "<defs>\n{}\n</defs>", self.clip_defs.join("\n"))?;
        }
        writeln!(out, r#"<rect width="{}" height="{}" fill="white" />"#, self.width, self.height)?;
        for shape in &self.layers[0].1 {
            self.write_shape(out, shape)?;
        }
        writeln!(out, "</svg>")
    }

    fn write_shape(&self, out: &mut String, shape: &Shape) -> fmt::Result {
        match shape {
            Shape::Rect { x, y, w, h, style } => {
                write!(out, r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}""#)?;
                write_paint(out, style)?;
                writeln!(out, " />")
            }
            Shape::Circle { cx, cy, r, style } => {
                write!(out, r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}""#)?;
                write_paint(out, style)?;
                writeln!(out, " />")
            }
            Shape::Line { from: (x1, y1), to: (x2, y2), style } => {
                write!(out, r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}""#)?;
                write_stroke(out, style)?;
                writeln!(out, " />")
            }
            Shape::Polyline { points, style } => {
                out.push_str(r#"<polyline points=""#);
                for (i, (x, y)) in points.iter().enumerate() {
                    let sep = if i == 0 { "" } else { " " };
                    write!(out, "{sep}{x:.2},{y:.2}")?;
                }
                out.push_str(r#"" fill="none""#);
                write_stroke(out, style)?;
                writeln!(out, " />")
            }
            Shape::Text { at: (x, y), content, style, angle } => {
                write!(
                    out,
                    r#"<text x="{x:.2}" y="{y:.2}" font-family="{}" font-size="{:.1}" fill="{}" text-anchor="{}" dominant-baseline="{}""#,
                    xml_escape(&self.font_family),
                    style.size,
                    style.color.to_svg_fill(),
                    style.anchor.as_str(),
                    style.baseline.as_str(),
                )?;
                if style.bold {
                    out.push_str(r#" font-weight="bold""#);
                }
                if let Some(a) = angle {
                    write!(out, r#" transform="rotate({a:.1},{x:.2},{y:.2})""#)?;
                }
                writeln!(out, ">{}</text>", xml_escape(content))
            }
            Shape::Clipped { id, children } => {
                writeln!(out, r#"<g clip-path="url(#{id})">"#)?;
                for child in children {
                    self.write_shape(out, child)?;
                }
                writeln!(out, "</g>")
            }
        }
    }
}

fn write_paint(out: &mut String, style: &Style) -> fmt::Result {
    let fill = style.fill.as_ref().map_or_else(|| "none".to_string(), Color::to_svg_fill);
    write!(out, r#" fill="{fill}""#)?;
    match &style.stroke {
        Some(stroke) => write!(out, r#" stroke="{}" stroke-width="{:.2}""#, stroke.to_svg_fill(), style.stroke_width),
        None => Ok(()),
    }
}

fn write_stroke(out: &mut String, style: &LineStyle) -> fmt::Result {
    write!(out, r#" stroke="{}" stroke-width="{:.2}""#, style.color.to_svg_fill(), style.width)?;
    match style.dash {
        Some((on, off)) => write!(out, r#" stroke-dasharray="{on} {off}""#),
        None => Ok(()),
    }
}

fn xml_escape(s: &str) -> String {
    s.chars().fold(String::with_capacity(s.len()), |mut out, ch| {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
        out
    })
}
