//! Automation shape generator for the drawing tools.
//!
//! `Line` samples densely. The periodic tools emit only their turning points
//! and let the breakpoint curve carry the segment shape.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::state::automation::{AutomationBreakpoint, CurveType};

/// Absorbs float error when counting grid steps.
const STEP_EPSILON: f64 = 1e-9;

/// Fewest points a periodic shape produces for a non-empty range.
const MIN_PERIODIC_POINTS: usize = 4;

/// Most points one drawing gesture may produce. Requests denser than this
/// generate nothing.
pub const MAX_SHAPE_POINTS: usize = 16_384;

/// Whole steps of `step` that fit in `span`, or `None` past the point limit.
fn step_count(span: f64, step: f64) -> Option<usize> {
    let steps = (span / step + STEP_EPSILON).floor();
    // Room for the closing point a periodic shape may add
    if steps.is_finite() && steps < (MAX_SHAPE_POINTS - 1) as f64 {
        Some(steps as usize)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeTool {
    Line,
    Triangle,
    Sine,
    Square,
}

impl ShapeTool {
    /// Curve stored on each breakpoint so playback reproduces the shape
    /// between turning points.
    fn segment_curve(self) -> CurveType {
        match self {
            ShapeTool::Line | ShapeTool::Triangle => CurveType::Linear,
            ShapeTool::Sine => CurveType::SCurve,
            ShapeTool::Square => CurveType::Step,
        }
    }

    /// Normalized shape value (0..=1) at `phase` within one period.
    fn unit_value(self, phase: f64) -> f64 {
        match self {
            ShapeTool::Line => phase,
            ShapeTool::Triangle => {
                if phase < 0.5 {
                    2.0 * phase
                } else {
                    2.0 - 2.0 * phase
                }
            }
            ShapeTool::Sine => (1.0 - (TAU * phase).cos()) / 2.0,
            ShapeTool::Square => {
                if phase < 0.5 {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }
}

/// Everything a drawing gesture needs to regenerate its breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeRequest {
    pub tool: ShapeTool,
    /// Range in bars, relative to the container start
    pub start: f64,
    pub end: f64,
    pub start_value: f64,
    pub end_value: f64,
    pub grid: f64,
}

impl ShapeRequest {
    pub fn points(&self) -> Vec<AutomationBreakpoint> {
        generate(
            self.tool,
            self.start,
            self.end,
            self.start_value,
            self.end_value,
            self.grid,
        )
    }
}

/// Breakpoints for `tool` across `[start, end]`, ordered by position.
///
/// Non-finite input, a non-positive grid or a grid so fine that the result
/// would exceed [`MAX_SHAPE_POINTS`] yields nothing; an empty range yields one
/// point at `start`. Values always land in `[0, 1]`.
pub fn generate(
    tool: ShapeTool,
    start: f64,
    end: f64,
    start_value: f64,
    end_value: f64,
    grid: f64,
) -> Vec<AutomationBreakpoint> {
    let inputs = [start, end, start_value, end_value, grid];
    if inputs.iter().any(|v| !v.is_finite()) || grid <= 0.0 {
        return Vec::new();
    }
    let low = start_value.clamp(0.0, 1.0);
    let high = end_value.clamp(0.0, 1.0);
    if end <= start {
        return vec![AutomationBreakpoint::with_curve(start, low, tool.segment_curve())];
    }

    match tool {
        ShapeTool::Line => line(start, end, low, high, grid),
        _ => periodic(tool, start, end, low, high, 4.0 * grid),
    }
}

fn line(start: f64, end: f64, low: f64, high: f64, grid: f64) -> Vec<AutomationBreakpoint> {
    let span = end - start;
    let Some(steps) = step_count(span, grid) else {
        return Vec::new();
    };
    (0..=steps)
        .map(|i| {
            let position = start + i as f64 * grid;
            let t = ((position - start) / span).min(1.0);
            AutomationBreakpoint::new(position, low + (high - low) * t)
        })
        .collect()
}

fn periodic(
    tool: ShapeTool,
    start: f64,
    end: f64,
    low: f64,
    high: f64,
    period: f64,
) -> Vec<AutomationBreakpoint> {
    let value_at = |position: f64| {
        let phase = ((position - start) / period).rem_euclid(1.0);
        low + (high - low) * tool.unit_value(phase)
    };
    let curve = tool.segment_curve();
    let half = period / 2.0;
    let span = end - start;
    let Some(turns) = step_count(span, half) else {
        return Vec::new();
    };

    let mut points: Vec<AutomationBreakpoint> = (0..=turns)
        .map(|k| {
            let value = if k % 2 == 0 { low } else { high };
            AutomationBreakpoint::with_curve(start + k as f64 * half, value, curve)
        })
        .collect();
    let last = start + turns as f64 * half;
    if end - last > STEP_EPSILON * period {
        points.push(AutomationBreakpoint::with_curve(end, value_at(end), curve));
    }

    if points.len() < MIN_PERIODIC_POINTS {
        // Range shorter than a period: sample the shape itself
        let last_index = (MIN_PERIODIC_POINTS - 1) as f64;
        let sampled_curve = match tool {
            ShapeTool::Square => CurveType::Step,
            _ => CurveType::Linear,
        };
        points = (0..MIN_PERIODIC_POINTS)
            .map(|i| {
                let position = start + span * i as f64 / last_index;
                AutomationBreakpoint::with_curve(position, value_at(position), sampled_curve)
            })
            .collect();
    }
    points
}
