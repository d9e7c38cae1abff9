use rayon::prelude::*;

use crate::{Accessors, Color, PathPoint};

/// Per-instance attributes for every segment of every path, flattened into the streams a
/// renderer uploads. Segments are ordered by entity, then by point along the path; index `i` in
/// every stream refers to the same segment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentAttributes {
    // (x, y, time) per segment
    start_positions: Vec<f64>,
    end_positions: Vec<f64>,
    // (start z, end z)
    elevations: Vec<f64>,
    radii: Vec<f64>,
    // RGBA
    colors: Vec<u8>,
    picking_indices: Vec<u32>,
    picking_colors: Vec<u8>,
    // 1 for the final segment of a path, 0 otherwise
    last_segment: Vec<u8>,
}

/// One segment, read back out of the attribute streams.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: PathPoint,
    pub end: PathPoint,
    pub radius: f64,
    pub color: [u8; 4],
    pub picking_index: u32,
    pub picking_color: [u8; 3],
    pub is_last_segment: bool,
}

/// A named attribute stream, with the number of components per instance.
pub struct AttributeBuffer<'a> {
    pub name: &'static str,
    pub size: usize,
    pub bytes: &'a [u8],
}

/// Breaks every entity's path into segments. Entities with fewer than 2 points contribute
/// nothing. Calling this again with the same input produces identical streams.
pub fn derive<T: Sync>(data: &[T], accessors: &Accessors<T>) -> SegmentAttributes {
    // Accessors might be slow, so call them in parallel. collect() keeps entity order.
    let per_entity: Vec<(Vec<PathPoint>, f64, Color)> = data
        .par_iter()
        .enumerate()
        .map(|(idx, x)| {
            (
                (accessors.get_path)(x, idx),
                (accessors.get_radius)(x, idx),
                (accessors.get_color)(x, idx),
            )
        })
        .collect();

    let total = per_entity
        .iter()
        .map(|(path, _, _)| path.len().saturating_sub(1))
        .sum();
    let mut attrs = SegmentAttributes::with_capacity(total);
    for (idx, (path, radius, color)) in per_entity.into_iter().enumerate() {
        if path.len() < 2 {
            continue;
        }
        let color = color.packed();
        let picking_color = encode_picking_color(idx);
        let last = path.len() - 2;
        for (seg_idx, pair) in path.windows(2).enumerate() {
            attrs.push(Segment {
                start: pair[0],
                end: pair[1],
                radius,
                color,
                picking_index: idx as u32,
                picking_color,
                is_last_segment: seg_idx == last,
            });
        }
    }
    debug!(
        "Derived {} segments from {} entities",
        attrs.len(),
        data.len()
    );
    attrs
}

impl SegmentAttributes {
    fn with_capacity(n: usize) -> Self {
        Self {
            start_positions: Vec::with_capacity(3 * n),
            end_positions: Vec::with_capacity(3 * n),
            elevations: Vec::with_capacity(2 * n),
            radii: Vec::with_capacity(n),
            colors: Vec::with_capacity(4 * n),
            picking_indices: Vec::with_capacity(n),
            picking_colors: Vec::with_capacity(3 * n),
            last_segment: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, seg: Segment) {
        self.start_positions
            .extend([seg.start.x, seg.start.y, seg.start.time]);
        self.end_positions
            .extend([seg.end.x, seg.end.y, seg.end.time]);
        self.elevations.extend([seg.start.z, seg.end.z]);
        self.radii.push(seg.radius);
        self.colors.extend(seg.color);
        self.picking_indices.push(seg.picking_index);
        self.picking_colors.extend(seg.picking_color);
        self.last_segment.push(seg.is_last_segment as u8);
    }

    /// The total number of segments
    pub fn len(&self) -> usize {
        self.radii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    /// Panics if `i` is out of bounds.
    pub fn segment(&self, i: usize) -> Segment {
        let s = &self.start_positions[3 * i..3 * i + 3];
        let e = &self.end_positions[3 * i..3 * i + 3];
        let z = &self.elevations[2 * i..2 * i + 2];
        let c = &self.colors[4 * i..4 * i + 4];
        let p = &self.picking_colors[3 * i..3 * i + 3];
        Segment {
            start: PathPoint::new(s[0], s[1], s[2]).with_z(z[0]),
            end: PathPoint::new(e[0], e[1], e[2]).with_z(z[1]),
            radius: self.radii[i],
            color: [c[0], c[1], c[2], c[3]],
            picking_index: self.picking_indices[i],
            picking_color: [p[0], p[1], p[2]],
            is_last_segment: self.last_segment[i] == 1,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Segment> + '_ {
        (0..self.len()).map(move |i| self.segment(i))
    }

    pub fn buffers(&self) -> Vec<AttributeBuffer<'_>> {
        vec![
            AttributeBuffer {
                name: "instanceStartPositions",
                size: 3,
                bytes: bytemuck::cast_slice(&self.start_positions),
            },
            AttributeBuffer {
                name: "instanceEndPositions",
                size: 3,
                bytes: bytemuck::cast_slice(&self.end_positions),
            },
            AttributeBuffer {
                name: "instanceElevations",
                size: 2,
                bytes: bytemuck::cast_slice(&self.elevations),
            },
            AttributeBuffer {
                name: "instanceRadius",
                size: 1,
                bytes: bytemuck::cast_slice(&self.radii),
            },
            AttributeBuffer {
                name: "instanceColors",
                size: 4,
                bytes: &self.colors,
            },
            AttributeBuffer {
                name: "instancePickingIndices",
                size: 1,
                bytes: bytemuck::cast_slice(&self.picking_indices),
            },
            AttributeBuffer {
                name: "instancePickingColors",
                size: 3,
                bytes: &self.picking_colors,
            },
            AttributeBuffer {
                name: "instanceIsLastSegment",
                size: 1,
                bytes: &self.last_segment,
            },
        ]
    }

    /// Every stream, concatenated in a fixed order
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        for buffer in self.buffers() {
            bytes.extend_from_slice(buffer.bytes);
        }
        bytes
    }
}

/// Entity indices are encoded off by one, so black means nothing was picked.
pub fn encode_picking_color(idx: usize) -> [u8; 3] {
    let x = idx + 1;
    [(x & 255) as u8, ((x >> 8) & 255) as u8, ((x >> 16) & 255) as u8]
}

pub fn decode_picking_color(color: [u8; 3]) -> Option<usize> {
    let x = color[0] as usize + ((color[1] as usize) << 8) + ((color[2] as usize) << 16);
    x.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entity {
        path: Vec<PathPoint>,
        radius: f64,
    }

    fn accessors() -> Accessors<Entity> {
        Accessors::new(|e: &Entity, _| e.path.clone()).radius(|e, _| e.radius)
    }

    fn straight(n: usize) -> Vec<PathPoint> {
        (0..n)
            .map(|i| PathPoint::new(i as f64, 0.0, 10.0 * i as f64))
            .collect()
    }

    #[test]
    fn entity_major_order() {
        let data = vec![
            Entity {
                path: straight(3),
                radius: 1.0,
            },
            Entity {
                path: straight(1),
                radius: 2.0,
            },
            Entity {
                path: straight(4),
                radius: 3.0,
            },
        ];
        let attrs = derive(&data, &accessors());
        assert_eq!(attrs.len(), 2 + 0 + 3);

        let segments: Vec<Segment> = attrs.iter().collect();
        let owners: Vec<u32> = segments.iter().map(|s| s.picking_index).collect();
        assert_eq!(owners, vec![0, 0, 2, 2, 2]);
        let radii: Vec<f64> = segments.iter().map(|s| s.radius).collect();
        assert_eq!(radii, vec![1.0, 1.0, 3.0, 3.0, 3.0]);
        let last: Vec<bool> = segments.iter().map(|s| s.is_last_segment).collect();
        assert_eq!(last, vec![false, true, false, false, true]);

        // Each segment connects consecutive points
        assert_eq!(segments[3].start, data[2].path[1]);
        assert_eq!(segments[3].end, data[2].path[2]);
        assert_eq!(segments[2].picking_color, encode_picking_color(2));
    }

    #[test]
    fn defaults() {
        let data = vec![straight(2)];
        let attrs = derive(&data, &Accessors::new(|p: &Vec<PathPoint>, _| p.clone()));
        let seg = attrs.segment(0);
        assert_eq!(seg.radius, 1.0);
        assert_eq!(seg.color, [0, 0, 0, 255]);
        assert!(seg.is_last_segment);
    }

    #[test]
    fn buffer_sizes_line_up() {
        let data = vec![
            Entity {
                path: straight(5),
                radius: 1.0,
            },
            Entity {
                path: straight(2),
                radius: 1.0,
            },
        ];
        let attrs = derive(&data, &accessors());
        let n = attrs.len();
        for buffer in attrs.buffers() {
            let bytes_per_component = match buffer.name {
                "instanceColors" | "instancePickingColors" | "instanceIsLastSegment" => 1,
                "instancePickingIndices" => 4,
                _ => 8,
            };
            assert_eq!(
                buffer.bytes.len(),
                bytes_per_component * buffer.size * n,
                "{} is misaligned",
                buffer.name
            );
        }
    }

    #[test]
    fn empty() {
        let attrs = derive(&Vec::<Entity>::new(), &accessors());
        assert!(attrs.is_empty());
        assert!(attrs.as_bytes().is_empty());
    }

    #[test]
    fn picking_colors() {
        assert_eq!(encode_picking_color(0), [1, 0, 0]);
        assert_eq!(encode_picking_color(255), [0, 1, 0]);
        assert_eq!(decode_picking_color([0, 0, 0]), None);
        for idx in [0, 1, 254, 255, 256, 70_000, (1 << 24) - 2] {
            assert_eq!(decode_picking_color(encode_picking_color(idx)), Some(idx));
        }
    }
}
