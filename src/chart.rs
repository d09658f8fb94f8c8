//! Chart descriptions and an SVG renderer for them.
//!
//! A [`ChartRenderer`] owns drawn charts until they are destroyed. Callers that
//! redraw the same chart go through a [`ChartSlot`], which always destroys the
//! previous chart before drawing the next one.

use html_escape::encode_quoted_attribute;
use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub border_color: String,
    /// One entry for line charts, one per segment for doughnuts.
    pub background_colors: Vec<String>,
    pub border_width: u32,
    pub fill: bool,
    pub tension: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartOptions {
    pub begin_at_zero: bool,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub dataset: Dataset,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChartHandle(u64);

pub trait ChartRenderer {
    fn draw(&mut self, spec: &ChartSpec) -> ChartHandle;
    fn destroy(&mut self, handle: ChartHandle);
}

/// Holds at most one chart drawn by a renderer.
#[derive(Debug, Default)]
pub struct ChartSlot {
    current: Option<ChartHandle>,
}

impl ChartSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<ChartHandle> {
        self.current
    }

    pub fn replace<R: ChartRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        spec: &ChartSpec,
    ) -> ChartHandle {
        if let Some(previous) = self.current.take() {
            renderer.destroy(previous);
        }
        let handle = renderer.draw(spec);
        self.current = Some(handle);
        handle
    }
}

/// Renders charts to standalone SVG documents.
#[derive(Debug, Default)]
pub struct SvgCanvas {
    next_id: u64,
    charts: BTreeMap<ChartHandle, String>,
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn svg(&self, handle: ChartHandle) -> Option<&str> {
        self.charts.get(&handle).map(String::as_str)
    }

    /// The most recently drawn chart that is still alive.
    pub fn latest(&self) -> Option<&str> {
        self.charts.values().next_back().map(String::as_str)
    }

    pub fn live(&self) -> usize {
        self.charts.len()
    }
}

impl ChartRenderer for SvgCanvas {
    fn draw(&mut self, spec: &ChartSpec) -> ChartHandle {
        self.next_id += 1;
        let handle = ChartHandle(self.next_id);
        let svg = match spec.kind {
            ChartKind::Line => render_line(spec),
            ChartKind::Doughnut => render_doughnut(spec),
        };
        self.charts.insert(handle, svg);
        handle
    }

    fn destroy(&mut self, handle: ChartHandle) {
        self.charts.remove(&handle);
    }
}

const LINE_WIDTH: f64 = 600.0;
const LINE_HEIGHT: f64 = 300.0;
const PADDING_X: f64 = 56.0;
const PADDING_Y: f64 = 46.0;
const TOP: f64 = 24.0;
const TICKS: usize = 4;
const MAX_X_LABELS: usize = 12;

fn placeholder(width: f64, height: f64) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" role="img"><text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text></svg>"#
    )
}

fn render_line(spec: &ChartSpec) -> String {
    let values = &spec.dataset.data;
    if values.is_empty() {
        return placeholder(LINE_WIDTH, LINE_HEIGHT);
    }

    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if spec.options.begin_at_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    if min == max {
        min -= 1.0;
        max += 1.0;
    }

    let range = max - min;
    let x_step = if values.len() > 1 {
        (LINE_WIDTH - PADDING_X * 2.0) / (values.len() - 1) as f64
    } else {
        0.0
    };
    let scale_y = (LINE_HEIGHT - TOP - PADDING_Y) / range;
    let x = |index: usize| PADDING_X + index as f64 * x_step;
    let y = |value: f64| LINE_HEIGHT - PADDING_Y - (value - min) * scale_y;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {LINE_WIDTH} {LINE_HEIGHT}" role="img" aria-label="{}">"#,
        encode_quoted_attribute(&spec.dataset.label)
    );

    for tick in 0..=TICKS {
        let value = min + range * tick as f64 / TICKS as f64;
        let y_pos = y(value);
        let _ = write!(
            svg,
            r#"<line class="chart-grid" x1="{PADDING_X}" y1="{y_pos:.2}" x2="{}" y2="{y_pos:.2}" /><text class="chart-label" x="{}" y="{:.2}" text-anchor="end">{}</text>"#,
            LINE_WIDTH - PADDING_X,
            PADDING_X - 8.0,
            y_pos + 4.0,
            axis_value(value)
        );
    }

    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(index, value)| (x(index), y(*value)))
        .collect();
    let path = points
        .iter()
        .enumerate()
        .map(|(index, (px, py))| format!("{} {px:.2} {py:.2}", if index == 0 { 'M' } else { 'L' }))
        .collect::<Vec<_>>()
        .join(" ");

    let fill = spec
        .dataset
        .background_colors
        .first()
        .map(String::as_str)
        .unwrap_or("none");
    if spec.dataset.fill {
        let baseline = LINE_HEIGHT - PADDING_Y;
        let _ = write!(
            svg,
            r#"<path class="chart-area" d="{path} L {:.2} {baseline:.2} L {:.2} {baseline:.2} Z" fill="{fill}" stroke="none" />"#,
            points[points.len() - 1].0,
            points[0].0,
        );
    }
    let _ = write!(
        svg,
        r#"<path class="chart-line" d="{path}" fill="none" stroke="{}" stroke-width="{}" />"#,
        spec.dataset.border_color, spec.dataset.border_width
    );

    let label_every = spec.labels.len().div_ceil(MAX_X_LABELS).max(1);
    for (index, label) in spec.labels.iter().enumerate().take(values.len()) {
        if index % label_every != 0 {
            continue;
        }
        let _ = write!(
            svg,
            r#"<text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            x(index),
            LINE_HEIGHT - PADDING_Y + 16.0,
            encode_quoted_attribute(label)
        );
    }

    if let Some(title) = &spec.options.x_title {
        let _ = write!(
            svg,
            r#"<text class="chart-title" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            LINE_WIDTH / 2.0,
            LINE_HEIGHT - 6.0,
            encode_quoted_attribute(title)
        );
    }
    if let Some(title) = &spec.options.y_title {
        let cy = (TOP + LINE_HEIGHT - PADDING_Y) / 2.0;
        let _ = write!(
            svg,
            r#"<text class="chart-title" x="14" y="{cy}" text-anchor="middle" transform="rotate(-90 14 {cy})">{}</text>"#,
            encode_quoted_attribute(title)
        );
    }

    svg.push_str("</svg>");
    svg
}

const DOUGHNUT_SIZE: f64 = 240.0;
const DOUGHNUT_RADIUS: f64 = 80.0;
const DOUGHNUT_STROKE: f64 = 36.0;

fn render_doughnut(spec: &ChartSpec) -> String {
    let total: f64 = spec.dataset.data.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return placeholder(DOUGHNUT_SIZE, DOUGHNUT_SIZE);
    }

    let center = DOUGHNUT_SIZE / 2.0;
    let circumference = 2.0 * PI * DOUGHNUT_RADIUS;
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {DOUGHNUT_SIZE} {DOUGHNUT_SIZE}" role="img" aria-label="{}">"#,
        encode_quoted_attribute(&spec.dataset.label)
    );

    // Segments start at twelve o'clock and run clockwise.
    let mut offset = 0.0;
    for (index, value) in spec.dataset.data.iter().enumerate() {
        if *value <= 0.0 {
            continue;
        }
        let length = value / total * circumference;
        let color = spec
            .dataset
            .background_colors
            .get(index)
            .map(String::as_str)
            .unwrap_or("#999999");
        let label = spec.labels.get(index).map(String::as_str).unwrap_or("");
        let _ = write!(
            svg,
            r#"<circle class="chart-segment" cx="{center}" cy="{center}" r="{DOUGHNUT_RADIUS}" fill="none" stroke="{color}" stroke-width="{DOUGHNUT_STROKE}" stroke-dasharray="{length:.3} {:.3}" stroke-dashoffset="{:.3}" transform="rotate(-90 {center} {center})"><title>{}</title></circle>"#,
            circumference - length,
            -offset,
            encode_quoted_attribute(label)
        );
        offset += length;
    }

    svg.push_str("</svg>");
    svg
}

fn axis_value(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}
