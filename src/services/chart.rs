//! Chart geometry in a normalized 0..100 coordinate space.
//!
//! The functions here turn count series into points and SVG path data; they
//! never divide by zero (denominators are floored at 1) and report an empty
//! chart instead of degenerate geometry.

use std::fmt::{self, Write as _};

use serde::Serialize;
use utoipa::ToSchema;

/// Donut geometry, in viewBox units
pub const PIE_CENTER: f64 = 50.0;
pub const PIE_RADIUS: f64 = 40.0;
pub const PIE_HOLE_RADIUS: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point on a circle; 0 degrees is the positive x axis, angles grow clockwise in SVG
    fn on_circle(center: f64, radius: f64, degrees: f64) -> Self {
        let radians = degrees.to_radians();
        Self::new(center + radius * radians.cos(), center + radius * radians.sin())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
    ArcTo {
        radius: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

/// Typed builder for SVG path data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgPath {
    segments: Vec<Segment>,
}

impl SvgPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, to: Point) -> Self {
        self.segments.push(Segment::MoveTo(to));
        self
    }

    pub fn line_to(mut self, to: Point) -> Self {
        self.segments.push(Segment::LineTo(to));
        self
    }

    pub fn cubic_to(mut self, c1: Point, c2: Point, to: Point) -> Self {
        self.segments.push(Segment::CubicTo(c1, c2, to));
        self
    }

    pub fn arc_to(mut self, radius: f64, large_arc: bool, sweep: bool, to: Point) -> Self {
        self.segments.push(Segment::ArcTo {
            radius,
            large_arc,
            sweep,
            to,
        });
        self
    }

    pub fn close(mut self) -> Self {
        self.segments.push(Segment::Close);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for SvgPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for segment in &self.segments {
            if !out.is_empty() {
                out.push(' ');
            }
            match segment {
                Segment::MoveTo(p) => write!(out, "M {},{}", p.x, p.y)?,
                Segment::LineTo(p) => write!(out, "L {},{}", p.x, p.y)?,
                Segment::CubicTo(c1, c2, p) => write!(
                    out,
                    "C {},{} {},{} {},{}",
                    c1.x, c1.y, c2.x, c2.y, p.x, p.y
                )?,
                Segment::ArcTo {
                    radius,
                    large_arc,
                    sweep,
                    to,
                } => write!(
                    out,
                    "A {} {} 0 {} {} {},{}",
                    radius,
                    radius,
                    u8::from(*large_arc),
                    u8::from(*sweep),
                    to.x,
                    to.y
                )?,
                Segment::Close => out.push('Z'),
            }
        }
        f.write_str(&out)
    }
}

/// Explicit empty state versus rendered geometry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "geometry", rename_all = "lowercase")]
pub enum ChartState<T> {
    Empty,
    Ready(T),
}

impl<T> From<Option<T>> for ChartState<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(geometry) => Self::Ready(geometry),
            None => Self::Empty,
        }
    }
}

fn is_blank(values: &[u64]) -> bool {
    values.iter().all(|v| *v == 0)
}

fn max_floored(values: &[u64]) -> f64 {
    values.iter().copied().max().unwrap_or(0).max(1) as f64
}

/// Normalize a series to points: x spread evenly over 0..100, y inverted so 0 is the top
pub fn points(values: &[u64]) -> Vec<Point> {
    let max = max_floored(values);
    let step = 100.0 / values.len().saturating_sub(1).max(1) as f64;

    values
        .iter()
        .enumerate()
        .map(|(i, v)| Point::new(i as f64 * step, 100.0 - *v as f64 / max * 100.0))
        .collect()
}

/// Smoothed path through the points.
///
/// Control points sit a third of the way along each horizontal span at the
/// height of the nearer endpoint.
pub fn smooth_path(points: &[Point]) -> SvgPath {
    let mut path = SvgPath::new();
    for (i, point) in points.iter().enumerate() {
        if i == 0 {
            path = path.move_to(*point);
            continue;
        }
        let prev = points[i - 1];
        let dx = (point.x - prev.x) / 3.0;
        path = path.cubic_to(
            Point::new(prev.x + dx, prev.y),
            Point::new(point.x - dx, point.y),
            *point,
        );
    }
    path
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LineChart {
    pub points: Vec<Point>,
    /// Stroke path
    pub path: String,
    /// Stroke path closed down to the baseline for the area fill
    pub area_path: String,
}

pub fn line_chart(values: &[u64]) -> Option<LineChart> {
    if is_blank(values) {
        return None;
    }

    let points = points(values);
    let line = smooth_path(&points);
    let area = line
        .clone()
        .line_to(Point::new(100.0, 100.0))
        .line_to(Point::new(0.0, 100.0))
        .close();

    Some(LineChart {
        path: line.to_string(),
        area_path: area.to_string(),
        points,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Bar {
    pub value: u64,
    /// Bar height as a percentage of the chart height
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacked: Option<StackedSegment>,
}

/// Sub-category segment drawn inside a bar
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StackedSegment {
    pub value: u64,
    /// Share of the bucket's total, as a percentage of the bar height
    pub height: f64,
}

/// One sub-category count per bucket, with each bucket's total as the denominator
#[derive(Debug, Clone, Copy)]
pub struct Stack<'a> {
    pub values: &'a [u64],
    pub totals: &'a [u64],
}

impl Stack<'_> {
    fn segment(&self, i: usize) -> StackedSegment {
        let value = self.values.get(i).copied().unwrap_or(0);
        let total = self.totals.get(i).copied().unwrap_or(0);
        StackedSegment {
            value,
            height: value as f64 / total.max(1) as f64 * 100.0,
        }
    }
}

/// Bars for `values`, optionally with a stacked segment per bucket
pub fn bar_chart(values: &[u64], stack: Option<Stack<'_>>) -> Option<Vec<Bar>> {
    if is_blank(values) {
        return None;
    }

    let max = max_floored(values);
    Some(
        values
            .iter()
            .enumerate()
            .map(|(i, value)| Bar {
                value: *value,
                height: *value as f64 / max * 100.0,
                stacked: stack.map(|s| s.segment(i)),
            })
            .collect(),
    )
}

/// One labelled value of a pie chart
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub label: String,
    pub value: u64,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Wedge {
    pub label: String,
    pub value: u64,
    pub percentage: f64,
    pub start_angle: f64,
    pub sweep_angle: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PieChart {
    pub total: u64,
    pub center: f64,
    pub radius: f64,
    /// Radius of the circle punched out for the donut hole
    pub hole_radius: f64,
    pub wedges: Vec<Wedge>,
}

fn wedge_path(start_angle: f64, sweep: f64) -> SvgPath {
    let center = Point::new(PIE_CENTER, PIE_CENTER);
    let start = Point::on_circle(PIE_CENTER, PIE_RADIUS, start_angle);

    if sweep >= 360.0 {
        // A single arc cannot start and end on the same point; split the disc in two
        let opposite = Point::on_circle(PIE_CENTER, PIE_RADIUS, start_angle + 180.0);
        return SvgPath::new()
            .move_to(start)
            .arc_to(PIE_RADIUS, true, true, opposite)
            .arc_to(PIE_RADIUS, true, true, start)
            .close();
    }

    let end = Point::on_circle(PIE_CENTER, PIE_RADIUS, start_angle + sweep);
    SvgPath::new()
        .move_to(center)
        .line_to(start)
        .arc_to(PIE_RADIUS, sweep > 180.0, true, end)
        .close()
}

/// Donut wedges for the non-zero categories, starting at 0 degrees
pub fn pie_chart(categories: &[Category]) -> Option<PieChart> {
    let total: u64 = categories.iter().map(|c| c.value).sum();
    if total == 0 {
        return None;
    }

    let mut start_angle = 0.0;
    let wedges = categories
        .iter()
        .filter(|c| c.value > 0)
        .map(|c| {
            let fraction = c.value as f64 / total as f64;
            let sweep = fraction * 360.0;
            let wedge = Wedge {
                label: c.label.clone(),
                value: c.value,
                percentage: fraction * 100.0,
                start_angle,
                sweep_angle: sweep,
                color: c.color.clone(),
                path: wedge_path(start_angle, sweep).to_string(),
            };
            start_angle += sweep;
            wedge
        })
        .collect();

    Some(PieChart {
        total,
        center: PIE_CENTER,
        radius: PIE_RADIUS,
        hole_radius: PIE_HOLE_RADIUS,
        wedges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(label: &str, value: u64) -> Category {
        Category {
            label: label.to_string(),
            value,
            color: None,
        }
    }

    #[test]
    fn test_points_are_normalized() {
        let pts = points(&[0, 5, 10]);
        assert_eq!(pts[0], Point::new(0.0, 100.0));
        assert_eq!(pts[1], Point::new(50.0, 50.0));
        assert_eq!(pts[2], Point::new(100.0, 0.0));
    }

    #[test]
    fn test_single_point_does_not_divide_by_zero() {
        let pts = points(&[3]);
        assert_eq!(pts, vec![Point::new(0.0, 0.0)]);
    }

    #[test]
    fn test_smooth_path_control_points() {
        let path = smooth_path(&[Point::new(0.0, 100.0), Point::new(30.0, 40.0)]);
        assert_eq!(path.to_string(), "M 0,100 C 10,100 20,40 30,40");
    }

    #[test]
    fn test_line_chart_area_closes_to_baseline() {
        let chart = line_chart(&[1, 2]).unwrap();
        assert!(chart.area_path.starts_with(&chart.path));
        assert!(chart.area_path.ends_with("L 100,100 L 0,100 Z"));
    }

    #[test]
    fn test_all_zero_series_is_empty() {
        assert!(line_chart(&[0; 12]).is_none());
        assert!(line_chart(&[]).is_none());
        assert!(bar_chart(&[0; 12], None).is_none());
        assert!(pie_chart(&[category("Active", 0)]).is_none());
        assert_eq!(ChartState::from(line_chart(&[])), ChartState::Empty);
    }

    #[test]
    fn test_bar_heights() {
        let totals = [2, 4, 0];
        let active = [1, 4, 0];
        let bars = bar_chart(
            &totals,
            Some(Stack {
                values: &active,
                totals: &totals,
            }),
        )
        .unwrap();

        assert_eq!(bars[0].height, 50.0);
        assert_eq!(bars[1].height, 100.0);
        assert_eq!(bars[2].height, 0.0);

        let stacked: Vec<f64> = bars.iter().map(|b| b.stacked.as_ref().unwrap().height).collect();
        assert_eq!(stacked, vec![50.0, 100.0, 0.0]);
    }

    #[test]
    fn test_stacked_share_uses_bucket_total() {
        // Bars follow one stage while the segment measures another against the total
        let ended = [1, 0];
        let active = [2, 0];
        let totals = [3, 1];
        let bars = bar_chart(
            &ended,
            Some(Stack {
                values: &active,
                totals: &totals,
            }),
        )
        .unwrap();

        let segment = bars[0].stacked.as_ref().unwrap();
        assert_eq!(segment.value, 2);
        assert!((segment.height - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(bars[1].stacked.as_ref().unwrap().height, 0.0);
    }

    #[test]
    fn test_bars_without_stack() {
        let bars = bar_chart(&[3, 1], None).unwrap();
        assert!(bars.iter().all(|b| b.stacked.is_none()));
        assert!((bars[1].height - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_pie_wedges_cover_full_circle() {
        let chart = pie_chart(&[
            category("Active", 2),
            category("Upcoming", 0),
            category("Ended", 6),
        ])
        .unwrap();

        assert_eq!(chart.wedges.len(), 2);
        let total_sweep: f64 = chart.wedges.iter().map(|w| w.sweep_angle).sum();
        assert!((total_sweep - 360.0).abs() < 1e-9);

        assert_eq!(chart.wedges[0].start_angle, 0.0);
        assert_eq!(chart.wedges[1].start_angle, 90.0);
        // Second wedge spans 270 degrees, so it needs the large-arc flag
        assert!(chart.wedges[1].path.contains("A 40 40 0 1 1"));
        assert!(chart.wedges[0].path.contains("A 40 40 0 0 1"));
    }

    #[test]
    fn test_single_category_pie_is_full_disc() {
        let chart = pie_chart(&[category("Active", 3), category("Ended", 0)]).unwrap();
        assert_eq!(chart.wedges.len(), 1);
        assert_eq!(chart.wedges[0].sweep_angle, 360.0);
        let path = &chart.wedges[0].path;
        assert!(path.starts_with("M 90,50 A 40 40 0 1 1 10,"));
        assert!(path.ends_with("A 40 40 0 1 1 90,50 Z"));
    }
}
