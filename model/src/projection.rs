use geom::Bounds;

/// Maps world coordinates onto the screen. Evaluation happens on many threads at once, so
/// implementations must be shareable.
pub trait Projection: Sync {
    fn project_position(&self, pt: [f64; 2]) -> [f64; 2];
    /// Converts a world distance to pixels
    fn project_scale(&self, dist: f64) -> f64;
}

/// World coordinates are already pixels.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Projection for Identity {
    fn project_position(&self, pt: [f64; 2]) -> [f64; 2] {
        pt
    }

    fn project_scale(&self, dist: f64) -> f64 {
        dist
    }
}

/// A pixel canvas looking at some world bounds, with uniform scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub center: [f64; 2],
    /// Pixels per world unit
    pub scale: f64,
}

impl Viewport {
    /// Fits the bounds into the canvas, then zooms in by a factor of `2^zoom` around the center.
    pub fn fit(bounds: &Bounds, width: f64, height: f64, zoom: f64) -> Self {
        let scale_x = width / (bounds.max_x - bounds.min_x);
        let scale_y = height / (bounds.max_y - bounds.min_y);
        let mut scale = scale_x.min(scale_y);
        // Degenerate bounds, like a single point
        if !scale.is_finite() || scale <= 0.0 {
            scale = 1.0;
        }
        Self {
            width,
            height,
            center: [
                (bounds.min_x + bounds.max_x) / 2.0,
                (bounds.min_y + bounds.max_y) / 2.0,
            ],
            scale: scale * 2.0_f64.powf(zoom),
        }
    }
}

impl Projection for Viewport {
    fn project_position(&self, pt: [f64; 2]) -> [f64; 2] {
        [
            (pt[0] - self.center[0]) * self.scale + self.width / 2.0,
            (pt[1] - self.center[1]) * self.scale + self.height / 2.0,
        ]
    }

    fn project_scale(&self, dist: f64) -> f64 {
        dist * self.scale
    }
}
