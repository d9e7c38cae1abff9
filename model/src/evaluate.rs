//! Decides where and how visibly to draw one segment's marker at some moment. Every call is
//! independent of every other, so a whole frame is just a parallel map over the segments.

use serde::{Deserialize, Serialize};

use crate::{Projection, Segment};

/// Segments shorter than this (in time) can't be interpolated along.
const ZERO_DURATION: f64 = 1e-9;

/// The corners of a square just covering the unit disc, drawn as a triangle fan.
pub const MARKER_QUAD: [[f64; 3]; 4] = [
    [-1.0, -1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
];

/// What happens to a segment once the current time passes its end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadePolicy {
    /// Stay at the end position, fading out over one more segment duration.
    ExitFade,
    /// Only the last segment of a path stays, fading in at its final resting place over
    /// `fade_in_time`. Afterwards it disappears.
    EntryFade,
}

/// How opaque a segment is while the current time is between its start and end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveAlpha {
    Full,
    /// Scaled by how far along the segment the current time is
    Progress,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rejection {
    /// Both endpoints share a timestamp
    ZeroDuration,
    /// NaN or infinity showed up somewhere
    NonFinite,
    /// Faster than `max_speed`; probably GPS noise
    TooFast,
    /// Longer than `max_distance`
    TooFar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Rejected(Rejection),
    /// The current time is before the segment starts
    Pending,
    Active,
    /// The current time is after the segment ends
    Completed,
}

/// Everything the evaluator needs besides the segment itself. Fixed for a whole frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameConfig {
    pub current_time: f64,
    /// In projected units per unit of time
    pub max_speed: f64,
    /// In projected units
    pub max_distance: f64,
    pub fade_in_time: f64,
    pub fade_policy: FadePolicy,
    pub active_alpha: ActiveAlpha,
    pub opacity: f64,
    pub radius_scale: f64,
    pub radius_min_pixels: f64,
    pub radius_max_pixels: f64,
    pub outline: bool,
    pub stroke_width: f64,
}

impl FrameConfig {
    /// No filtering and no fading in, at the given time
    pub fn at(current_time: f64) -> Self {
        Self {
            current_time,
            max_speed: f64::INFINITY,
            max_distance: f64::INFINITY,
            fade_in_time: f64::INFINITY,
            fade_policy: FadePolicy::ExitFade,
            active_alpha: ActiveAlpha::Full,
            opacity: 1.0,
            radius_scale: 1.0,
            radius_min_pixels: 0.0,
            radius_max_pixels: f64::MAX,
            outline: false,
            stroke_width: 1.0,
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        FrameConfig::at(0.0)
    }
}

/// A marker to draw. All values are finite.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Marker {
    /// Projected x and y, plus the interpolated elevation
    pub center: [f64; 3],
    /// RGBA on a 0-1 scale. Alpha has the time fade, base alpha, and opacity applied.
    pub color: [f64; 4],
    pub radius_pixels: f64,
    /// 0 for a filled disc; otherwise the inner edge of the outline
    pub inner_unit_radius: f64,
    pub picking_color: [u8; 3],
}

impl Marker {
    /// Does the disc (or ring, for outlines) cover this screen point?
    pub fn covers(&self, pt: [f64; 2]) -> bool {
        let dx = (pt[0] - self.center[0]) / self.radius_pixels;
        let dy = (pt[1] - self.center[1]) / self.radius_pixels;
        let dist = dx.hypot(dy);
        dist <= 1.0 && dist >= self.inner_unit_radius
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PointSample {
    pub phase: Phase,
    /// None means don't draw anything
    pub marker: Option<Marker>,
}

impl PointSample {
    fn hidden(phase: Phase) -> Self {
        Self {
            phase,
            marker: None,
        }
    }

    pub fn visible(&self) -> bool {
        self.marker.is_some()
    }
}

pub fn evaluate<P: Projection + ?Sized>(
    seg: &Segment,
    config: &FrameConfig,
    projection: &P,
) -> PointSample {
    let elapsed = seg.end.time - seg.start.time;
    if !elapsed.is_finite() {
        return PointSample::hidden(Phase::Rejected(Rejection::NonFinite));
    }
    if elapsed.abs() <= ZERO_DURATION {
        return PointSample::hidden(Phase::Rejected(Rejection::ZeroDuration));
    }
    let frac = (config.current_time - seg.start.time) / elapsed;
    if !frac.is_finite() {
        return PointSample::hidden(Phase::Rejected(Rejection::NonFinite));
    }

    // The filters don't depend on time at all
    let start = projection.project_position([seg.start.x, seg.start.y]);
    let end = projection.project_position([seg.end.x, seg.end.y]);
    let distance = (end[0] - start[0]).hypot(end[1] - start[1]);
    if !distance.is_finite() {
        return PointSample::hidden(Phase::Rejected(Rejection::NonFinite));
    }
    if distance / elapsed > config.max_speed {
        return PointSample::hidden(Phase::Rejected(Rejection::TooFast));
    }
    if distance > config.max_distance {
        return PointSample::hidden(Phase::Rejected(Rejection::TooFar));
    }

    // (phase, alpha from the time fade, how far to interpolate)
    let (phase, time_alpha, pct) = if frac < 0.0 {
        return PointSample::hidden(Phase::Pending);
    } else if frac <= 1.0 {
        let alpha = match config.active_alpha {
            ActiveAlpha::Full => 1.0,
            ActiveAlpha::Progress => frac,
        };
        (Phase::Active, alpha, frac)
    } else {
        match config.fade_policy {
            FadePolicy::ExitFade => (Phase::Completed, 2.0 - frac, 1.0),
            FadePolicy::EntryFade => {
                if !seg.is_last_segment {
                    return PointSample::hidden(Phase::Completed);
                }
                let fade_in = (config.current_time - seg.end.time) / config.fade_in_time;
                // NaN fails this too
                if !(0.0..=1.0).contains(&fade_in) {
                    return PointSample::hidden(Phase::Completed);
                }
                (Phase::Completed, fade_in, 1.0)
            }
        }
    };

    let base_alpha = seg.color[3] as f64 / 255.0;
    let alpha = time_alpha.clamp(0.0, 1.0) * base_alpha * config.opacity;
    if !(alpha > 0.0) {
        return PointSample::hidden(phase);
    }

    let center = [
        start[0] + pct * (end[0] - start[0]),
        start[1] + pct * (end[1] - start[1]),
        seg.start.z + pct * (seg.end.z - seg.start.z),
    ];
    if !center.iter().all(|x| x.is_finite()) {
        return PointSample::hidden(Phase::Rejected(Rejection::NonFinite));
    }

    let mut radius_pixels = projection
        .project_scale(config.radius_scale * seg.radius)
        .max(config.radius_min_pixels)
        .min(config.radius_max_pixels);
    // The outline is centered on the radius
    if config.outline {
        radius_pixels += config.stroke_width / 2.0;
    }
    if !(radius_pixels > 0.0) || !radius_pixels.is_finite() {
        return PointSample::hidden(phase);
    }
    let inner_unit_radius = if config.outline {
        (1.0 - config.stroke_width / radius_pixels).max(0.0)
    } else {
        0.0
    };

    PointSample {
        phase,
        marker: Some(Marker {
            center,
            color: [
                seg.color[0] as f64 / 255.0,
                seg.color[1] as f64 / 255.0,
                seg.color[2] as f64 / 255.0,
                alpha.min(1.0),
            ],
            radius_pixels,
            inner_unit_radius,
            picking_color: seg.picking_color,
        }),
    }
}
