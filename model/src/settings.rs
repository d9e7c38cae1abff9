use serde::{Deserialize, Serialize};

use crate::{ActiveAlpha, FadePolicy, FrameConfig, Projection};

/// Persistent, user-facing layer settings. Distances and speeds are in world units; they're
/// projected when a frame is configured. Missing limits are unbounded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSettings {
    pub radius_scale: f64,
    pub radius_min_pixels: f64,
    pub radius_max_pixels: Option<f64>,
    pub outline: bool,
    pub stroke_width: f64,
    pub opacity: f64,
    /// World units per unit of time
    pub max_speed: Option<f64>,
    pub max_distance: Option<f64>,
    pub fade_in_time: Option<f64>,
    pub fade_policy: FadePolicy,
    pub active_alpha: ActiveAlpha,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            radius_scale: 1.0,
            radius_min_pixels: 0.0,
            radius_max_pixels: None,
            outline: false,
            stroke_width: 1.0,
            opacity: 1.0,
            max_speed: None,
            max_distance: None,
            fade_in_time: None,
            fade_policy: FadePolicy::ExitFade,
            active_alpha: ActiveAlpha::Full,
        }
    }
}

impl LayerSettings {
    pub fn frame_config<P: Projection + ?Sized>(
        &self,
        current_time: f64,
        projection: &P,
    ) -> FrameConfig {
        FrameConfig {
            current_time,
            max_speed: self
                .max_speed
                .map(|x| projection.project_scale(x))
                .unwrap_or(f64::INFINITY),
            max_distance: self
                .max_distance
                .map(|x| projection.project_scale(x))
                .unwrap_or(f64::INFINITY),
            fade_in_time: self.fade_in_time.unwrap_or(f64::INFINITY),
            fade_policy: self.fade_policy,
            active_alpha: self.active_alpha,
            opacity: self.opacity,
            radius_scale: self.radius_scale,
            radius_min_pixels: self.radius_min_pixels,
            radius_max_pixels: self.radius_max_pixels.unwrap_or(f64::MAX),
            outline: self.outline,
            stroke_width: self.stroke_width,
        }
    }
}
