//! Automation lane types for container parameter automation.

use serde::{Deserialize, Serialize};

use crate::LaneId;

/// Interpolation curve between a breakpoint and the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurveType {
    /// Linear interpolation (default)
    #[default]
    Linear,
    /// Hold until the next breakpoint
    Step,
    /// Smoothstep S-curve
    SCurve,
}

impl CurveType {
    /// Shape `t` (0..=1 across the segment) according to this curve.
    pub fn apply(self, t: f64) -> f64 {
        match self {
            CurveType::Linear => t,
            CurveType::Step => 0.0,
            CurveType::SCurve => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// A single automation breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutomationBreakpoint {
    /// Position in bars, relative to the container start
    pub position: f64,
    /// Normalized value (0.0-1.0)
    pub value: f64,
    /// Curve to the next breakpoint
    #[serde(default)]
    pub curve: CurveType,
}

impl AutomationBreakpoint {
    pub fn new(position: f64, value: f64) -> Self {
        Self {
            position,
            value: value.clamp(0.0, 1.0),
            curve: CurveType::default(),
        }
    }

    pub fn with_curve(position: f64, value: f64, curve: CurveType) -> Self {
        Self {
            position,
            value: value.clamp(0.0, 1.0),
            curve,
        }
    }
}

/// What a container automation lane drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutomationTarget {
    /// Container output gain
    Volume,
    /// Container pan
    Pan,
    /// Parameter of one of the container's own effects
    EffectParam {
        effect_index: usize,
        parameter_address: u64,
    },
}

impl AutomationTarget {
    pub fn name(&self) -> String {
        match self {
            AutomationTarget::Volume => "Volume".to_string(),
            AutomationTarget::Pan => "Pan".to_string(),
            AutomationTarget::EffectParam {
                effect_index,
                parameter_address,
            } => format!("FX{} P{}", effect_index + 1, parameter_address),
        }
    }
}

/// An automation lane holding breakpoints for a single target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationLane {
    pub id: LaneId,
    pub target: AutomationTarget,
    pub breakpoints: Vec<AutomationBreakpoint>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Two breakpoints closer than this share a position.
const POSITION_EPSILON: f64 = 1e-9;

impl AutomationLane {
    pub fn new(id: LaneId, target: AutomationTarget) -> Self {
        Self {
            id,
            target,
            breakpoints: Vec::new(),
            enabled: true,
        }
    }

    /// Add a breakpoint, keeping positions sorted and unique.
    pub fn add_breakpoint(&mut self, point: AutomationBreakpoint) {
        self.breakpoints
            .retain(|p| (p.position - point.position).abs() > POSITION_EPSILON);
        let pos = self
            .breakpoints
            .iter()
            .position(|p| p.position > point.position)
            .unwrap_or(self.breakpoints.len());
        self.breakpoints.insert(pos, point);
    }

    /// Remove the breakpoint at `position`. Returns whether one was removed.
    pub fn remove_breakpoint(&mut self, position: f64) -> bool {
        let before = self.breakpoints.len();
        self.breakpoints
            .retain(|p| (p.position - position).abs() > POSITION_EPSILON);
        self.breakpoints.len() != before
    }

    /// Replace everything within `[start, end]` with `points`.
    ///
    /// Single merge pass; on a shared position the incoming point wins.
    pub fn replace_range(&mut self, start: f64, end: f64, points: &[AutomationBreakpoint]) {
        let mut incoming = points.to_vec();
        incoming.sort_by(|a, b| a.position.total_cmp(&b.position));
        incoming.dedup_by(|later, earlier| {
            let same = (later.position - earlier.position).abs() <= POSITION_EPSILON;
            if same {
                *earlier = *later;
            }
            same
        });

        let kept = std::mem::take(&mut self.breakpoints).into_iter().filter(|p| {
            p.position < start - POSITION_EPSILON || p.position > end + POSITION_EPSILON
        });
        let mut merged = Vec::with_capacity(incoming.len());
        let mut incoming = incoming.into_iter().peekable();
        for point in kept {
            while let Some(next) = incoming.next_if(|n| n.position < point.position - POSITION_EPSILON) {
                merged.push(next);
            }
            let shadowed = incoming
                .peek()
                .is_some_and(|n| (n.position - point.position).abs() <= POSITION_EPSILON);
            if !shadowed {
                merged.push(point);
            }
        }
        merged.extend(incoming);
        self.breakpoints = merged;
    }

    /// Interpolated normalized value at `position`.
    pub fn value_at(&self, position: f64) -> Option<f64> {
        if self.breakpoints.is_empty() || !self.enabled {
            return None;
        }

        let mut prev: Option<&AutomationBreakpoint> = None;
        let mut next: Option<&AutomationBreakpoint> = None;
        for point in &self.breakpoints {
            if point.position <= position {
                prev = Some(point);
            } else {
                next = Some(point);
                break;
            }
        }

        match (prev, next) {
            (Some(p), None) => Some(p.value),
            (None, Some(n)) => Some(n.value),
            (Some(p), Some(n)) => {
                let span = n.position - p.position;
                if span <= POSITION_EPSILON {
                    return Some(p.value);
                }
                let t = p.curve.apply((position - p.position) / span);
                Some(p.value + (n.value - p.value) * t)
            }
            (None, None) => None,
        }
    }
}
