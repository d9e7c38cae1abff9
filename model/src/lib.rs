#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod accessors;
mod avl;
mod color;
mod evaluate;
mod layer;
mod projection;
mod segments;
mod settings;
mod trajectory;

use abstutil::{prettyprint_usize, Timer};
use anyhow::Result;
use geom::{Bounds, GPSBounds, Pt2D};
use serde::{Deserialize, Serialize};

pub use self::accessors::{Accessor, Accessors};
pub use self::color::Color;
pub use self::evaluate::{
    evaluate, ActiveAlpha, FadePolicy, FrameConfig, Marker, Phase, PointSample, Rejection,
    MARKER_QUAD,
};
pub use self::layer::{evaluate_frame, Frame, FrameStats, Layer};
pub use self::projection::{Identity, Projection, Viewport};
pub use self::segments::{
    decode_picking_color, derive, encode_picking_color, AttributeBuffer, Segment,
    SegmentAttributes,
};
pub use self::settings::LayerSettings;
pub use self::trajectory::{PathPoint, Trajectory};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleName(String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleID(pub usize);

/// Every vehicle seen in some AVL data.
#[derive(Serialize, Deserialize)]
pub struct Model {
    pub bounds: Bounds,
    pub gps_bounds: GPSBounds,
    // Indexed by VehicleID
    pub vehicles: Vec<Vehicle>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleID,
    pub original_id: VehicleName,
    pub trajectory: Trajectory,
}

impl Model {
    pub fn import_avl<R: std::io::Read>(reader: R, timer: &mut Timer) -> Result<Self> {
        timer.start("import AVL");
        let (gps_bounds, trajectories) = avl::load(reader)?;
        let mut vehicles = Vec::new();
        for (original_id, trajectory) in trajectories {
            vehicles.push(Vehicle {
                id: VehicleID(vehicles.len()),
                original_id,
                trajectory,
            });
        }
        timer.stop("import AVL");
        if vehicles.is_empty() {
            bail!("No vehicles have a usable trajectory");
        }
        info!("Imported {} vehicles", prettyprint_usize(vehicles.len()));

        Ok(Self {
            bounds: gps_bounds.to_bounds(),
            gps_bounds,
            vehicles,
        })
    }

    pub fn empty() -> Self {
        Self {
            // Avoid degenerate bounds
            bounds: Bounds::from(&[Pt2D::zero(), Pt2D::new(1.0, 1.0)]),
            gps_bounds: GPSBounds::new(),
            vehicles: Vec::new(),
        }
    }

    /// (earliest, latest) time of any vehicle, in seconds
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let start = self
            .vehicles
            .iter()
            .map(|v| v.trajectory.start_time())
            .min_by(|a, b| a.total_cmp(b))?;
        let end = self
            .vehicles
            .iter()
            .map(|v| v.trajectory.end_time())
            .max_by(|a, b| a.total_cmp(b))?;
        Some((start, end))
    }
}

impl Vehicle {
    /// Paths come from the trajectory; radius and color keep their defaults.
    pub fn accessors() -> Accessors<Vehicle> {
        Accessors::new(|v: &Vehicle, _| v.trajectory.points().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_and_render() {
        let csv = "\
vehicle,datetime,latitude,longitude
a,2022-05-01 08:00:00,-22.90,-43.20
a,2022-05-01 08:01:00,-22.91,-43.21
a,2022-05-01 08:02:00,-22.92,-43.20
b,2022-05-01 08:00:30,-22.91,-43.20
b,2022-05-01 08:01:30,-22.90,-43.21
";
        let mut timer = Timer::throwaway();
        let model = Model::import_avl(csv.as_bytes(), &mut timer).unwrap();
        assert_eq!(model.vehicles.len(), 2);
        assert_eq!(model.vehicles[1].id, VehicleID(1));
        assert_eq!(
            model.time_range(),
            Some((8.0 * 3600.0, 8.0 * 3600.0 + 120.0))
        );

        let layer = Layer::new(model.vehicles, Vehicle::accessors(), &mut timer);
        assert_eq!(layer.snapshot().len(), 3);
        let frame = layer.evaluate(&FrameConfig::at(8.0 * 3600.0 + 45.0), &Identity);
        // a is on its first segment, b is on its only one
        assert_eq!(frame.stats.active, 2);
        assert_eq!(frame.stats.pending, 1);
    }

    #[test]
    fn nothing_usable() {
        let csv = "vehicle,datetime,latitude,longitude\na,2022-05-01 08:00:00,-22.90,-43.20\n";
        assert!(Model::import_avl(csv.as_bytes(), &mut Timer::throwaway()).is_err());
        assert!(Model::empty().time_range().is_none());
    }
}
