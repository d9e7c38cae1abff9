use anyhow::Result;
use geom::{Distance, Duration, Speed};
use serde::{Deserialize, Serialize};

/// One timestamped sample along an entity's path. `z` is passed through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub time: f64,
    #[serde(default)]
    pub z: f64,
}

impl PathPoint {
    pub fn new(x: f64, y: f64, time: f64) -> Self {
        Self { x, y, time, z: 0.0 }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    pub fn dist_to(&self, other: &PathPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    fn lerp(&self, other: &PathPoint, pct: f64) -> PathPoint {
        PathPoint {
            x: self.x + pct * (other.x - self.x),
            y: self.y + pct * (other.y - self.y),
            time: self.time + pct * (other.time - self.time),
            z: self.z + pct * (other.z - self.z),
        }
    }
}

/// A path that's been checked: at least 2 finite points, in time order. The segmenter doesn't
/// need this, but importers and anything doing lookups on the CPU do.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trajectory {
    inner: Vec<PathPoint>,
}

impl Trajectory {
    pub fn new(raw: Vec<PathPoint>) -> Result<Self> {
        if raw.len() < 2 {
            bail!("Trajectory doesn't have at least 2 points");
        }
        for pt in &raw {
            if !pt.x.is_finite() || !pt.y.is_finite() || !pt.time.is_finite() {
                bail!("Trajectory has a non-finite point {:?}", pt);
            }
        }
        for pair in raw.windows(2) {
            if pair[0].time > pair[1].time {
                bail!(
                    "Trajectory input out-of-order: {} then {}",
                    pair[0].time,
                    pair[1].time
                );
            }
        }
        Ok(Self { inner: raw })
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.inner
    }

    pub fn start_time(&self) -> f64 {
        self.inner[0].time
    }

    pub fn end_time(&self) -> f64 {
        self.inner[self.inner.len() - 1].time
    }

    /// The index of the segment (pair of adjacent points) covering this time. None if the
    /// trajectory isn't active then.
    pub fn active_segment(&self, time: f64) -> Option<usize> {
        if !(time >= self.start_time() && time <= self.end_time()) {
            return None;
        }
        // The first point strictly after this time ends the segment
        let idx = self.inner.partition_point(|pt| pt.time <= time);
        Some(idx.clamp(1, self.inner.len() - 1) - 1)
    }

    /// None if the trajectory isn't active at this time
    pub fn interpolate(&self, time: f64) -> Option<(PathPoint, Speed)> {
        let idx = self.active_segment(time)?;
        let pt1 = self.inner[idx];
        let pt2 = self.inner[idx + 1];
        let elapsed = pt2.time - pt1.time;
        if elapsed <= 0.0 {
            return Some((pt1, Speed::ZERO));
        }
        let pos = pt1.lerp(&pt2, (time - pt1.time) / elapsed);
        let speed = Speed::from_dist_time(
            Distance::meters(pt1.dist_to(&pt2)),
            Duration::seconds(elapsed),
        );
        Some((pos, speed))
    }
}
