use std::sync::Arc;

use abstutil::{prettyprint_usize, Timer};
use rayon::prelude::*;
use serde::Serialize;

use crate::segments::{decode_picking_color, derive};
use crate::{
    evaluate, Accessors, FrameConfig, Phase, PointSample, Projection, Rejection,
    SegmentAttributes,
};

/// Owns some entities and the segments derived from them. Segments are only rebuilt when the
/// data or accessors change; every frame just evaluates the current snapshot.
pub struct Layer<T> {
    data: Vec<T>,
    accessors: Accessors<T>,
    // Readers may hold onto an old snapshot while a new one is derived
    segments: Arc<SegmentAttributes>,
    version: usize,
}

impl<T: Sync> Layer<T> {
    pub fn new(data: Vec<T>, accessors: Accessors<T>, timer: &mut Timer) -> Self {
        let mut layer = Self {
            data,
            accessors,
            segments: Arc::new(SegmentAttributes::default()),
            version: 0,
        };
        layer.rederive(timer);
        layer
    }

    pub fn set_data(&mut self, data: Vec<T>, timer: &mut Timer) {
        self.data = data;
        self.rederive(timer);
    }

    pub fn set_accessors(&mut self, accessors: Accessors<T>, timer: &mut Timer) {
        self.accessors = accessors;
        self.rederive(timer);
    }

    fn rederive(&mut self, timer: &mut Timer) {
        timer.start("derive segments");
        let segments = derive(&self.data, &self.accessors);
        timer.stop("derive segments");
        info!(
            "{} entities have {} segments",
            prettyprint_usize(self.data.len()),
            prettyprint_usize(segments.len())
        );
        // Publish the new snapshot all at once
        self.segments = Arc::new(segments);
        self.version += 1;
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Picking indices are just positions in the data list.
    pub fn entity(&self, picking_index: usize) -> Option<&T> {
        self.data.get(picking_index)
    }

    /// Uses `get_position` if there is one, otherwise the start of the entity's path.
    pub fn entity_position(&self, idx: usize) -> Option<[f64; 3]> {
        let x = self.data.get(idx)?;
        if let Some(ref get_position) = self.accessors.get_position {
            return Some(get_position(x, idx));
        }
        let path = (self.accessors.get_path)(x, idx);
        path.first().map(|pt| [pt.x, pt.y, pt.z])
    }

    pub fn snapshot(&self) -> Arc<SegmentAttributes> {
        self.segments.clone()
    }

    /// How many times segments have been derived
    pub fn version(&self) -> usize {
        self.version
    }

    pub fn evaluate<P: Projection + ?Sized>(&self, config: &FrameConfig, projection: &P) -> Frame {
        evaluate_frame(&self.segments, config, projection)
    }
}

/// Evaluates every segment independently, in parallel. Samples line up with segment indices.
pub fn evaluate_frame<P: Projection + ?Sized>(
    segments: &SegmentAttributes,
    config: &FrameConfig,
    projection: &P,
) -> Frame {
    let samples: Vec<PointSample> = (0..segments.len())
        .into_par_iter()
        .map(|i| evaluate(&segments.segment(i), config, projection))
        .collect();

    let mut stats = FrameStats::default();
    for sample in &samples {
        stats.add(sample);
    }
    Frame {
        time: config.current_time,
        samples,
        stats,
    }
}

#[derive(Serialize)]
pub struct Frame {
    pub time: f64,
    pub samples: Vec<PointSample>,
    pub stats: FrameStats,
}

impl Frame {
    /// (segment index, sample) for everything drawn
    pub fn visible(&self) -> impl Iterator<Item = (usize, &PointSample)> {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, sample)| sample.visible())
    }

    /// The picking index of the entity drawn on top at this screen point. Later segments are
    /// drawn over earlier ones.
    pub fn pick(&self, pt: [f64; 2]) -> Option<usize> {
        self.samples
            .iter()
            .rev()
            .filter_map(|sample| sample.marker.as_ref())
            .find(|marker| marker.covers(pt))
            .and_then(|marker| decode_picking_color(marker.picking_color))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub pending: usize,
    pub active: usize,
    /// Finished, but still drawn
    pub fading: usize,
    /// Not rejected, but not drawn either
    pub hidden: usize,
    pub zero_duration: usize,
    pub non_finite: usize,
    pub too_fast: usize,
    pub too_far: usize,
}

impl FrameStats {
    fn add(&mut self, sample: &PointSample) {
        match sample.phase {
            Phase::Pending => self.pending += 1,
            Phase::Active if sample.visible() => self.active += 1,
            Phase::Completed if sample.visible() => self.fading += 1,
            Phase::Active | Phase::Completed => self.hidden += 1,
            Phase::Rejected(Rejection::ZeroDuration) => self.zero_duration += 1,
            Phase::Rejected(Rejection::NonFinite) => self.non_finite += 1,
            Phase::Rejected(Rejection::TooFast) => self.too_fast += 1,
            Phase::Rejected(Rejection::TooFar) => self.too_far += 1,
        }
    }

    pub fn visible(&self) -> usize {
        self.active + self.fading
    }

    pub fn rejected(&self) -> usize {
        self.zero_duration + self.non_finite + self.too_fast + self.too_far
    }

    pub fn describe(&self) -> String {
        format!(
            "{} active, {} fading, {} pending, {} hidden, {} rejected",
            prettyprint_usize(self.active),
            prettyprint_usize(self.fading),
            prettyprint_usize(self.pending),
            prettyprint_usize(self.hidden),
            prettyprint_usize(self.rejected())
        )
    }
}
