//! Point and segment math for measurements.
//!
//! All coordinates are world-space meters in single precision.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::PrimitiveTopology;
use bevy::prelude::*;

/// Euclidean distance between two points, in meters.
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dz = b.z - a.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Ordered pair of endpoints handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Vec3,
    pub end: Vec3,
}

pub fn line_segment(a: Vec3, b: Vec3) -> LineSegment {
    LineSegment { start: a, end: b }
}

/// Build a two-vertex line-list mesh for a segment.
pub fn line_mesh(segment: &LineSegment) -> Mesh {
    Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default())
        .with_inserted_attribute(
            Mesh::ATTRIBUTE_POSITION,
            vec![segment.start.to_array(), segment.end.to_array()],
        )
}
