/*

    Axis Aligned Bounding Box and the extent fold
    over a set of scene objects.

    An object only has to tell us its world matrix and its
    local bounding corners (see Bounded), so anything the
    host hands us can be measured.

    @author: bartu
    @date: 9 Nov, 2025
*/

use serde::Serialize;

use crate::prelude::*;
use crate::interval::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BBox {
    pub min: Vector3,
    pub max: Vector3,
}

impl BBox {
    pub fn new_from(xint: &Interval, yint: &Interval, zint: &Interval) -> Self {

        assert!(xint.validate() && yint.validate() && zint.validate(), "Invalid interval, found max < min");
        Self {
            min: Vector3::new(xint.min, yint.min, zint.min),
            max: Vector3::new(xint.max, yint.max, zint.max),
        }
    }

    pub fn from_min_max(min: Vector3, max: Vector3) -> Self {
        Self::new_from(
            &Interval::new(min.x, max.x),
            &Interval::new(min.y, max.y),
            &Interval::new(min.z, max.z),
        )
    }

    pub fn from_center_size(center: Vector3, size: Vector3) -> Self {
        let half = size * 0.5;
        Self::from_min_max(center - half, center + half)
    }

    pub fn intervals(&self) -> [Interval; 3] {
        [
            Interval::new(self.min.x, self.max.x),
            Interval::new(self.min.y, self.max.y),
            Interval::new(self.min.z, self.max.z),
        ]
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    /// Per-axis extent (width, height, depth).
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    pub fn volume(&self) -> Float {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Grow symmetrically about the center by `margin` (a fraction of the size,
    /// e.g. 0.02 for 2%), half of the adjustment on each side.
    pub fn inflate(&self, margin: Float) -> BBox {
        let [x, y, z] = self.intervals().map(|i| i.inflate(margin));
        BBox::new_from(&x, &y, &z)
    }

    /// Degenerate box holding a single point.
    pub fn from_point(p: Vector3) -> Self {
        Self { min: p, max: p }
    }

    /// Grow to include `p`. NaN components are skipped.
    pub fn expand(&mut self, p: &Vector3) {
        self.min = component_min(self.min, *p);
        self.max = component_max(self.max, *p);
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            min: component_min(self.min, other.min),
            max: component_max(self.max, other.max),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    pub fn contains(&self, p: &Vector3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn corners(&self) -> [Vector3; 8] {
        box_corners(&self.min, &self.max)
    }
}

// Vector3::min/max hand back NaN from the right-hand side,
// f64::min/max return the other operand instead
fn component_min(a: Vector3, b: Vector3) -> Vector3 {
    Vector3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
}

fn component_max(a: Vector3, b: Vector3) -> Vector3 {
    Vector3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
}

/// The 8 corners of the box spanned by `min` and `max`.
pub fn box_corners(min: &Vector3, max: &Vector3) -> [Vector3; 8] {
    [
        Vector3::new(min.x, min.y, min.z),
        Vector3::new(min.x, min.y, max.z),
        Vector3::new(min.x, max.y, min.z),
        Vector3::new(min.x, max.y, max.z),
        Vector3::new(max.x, min.y, min.z),
        Vector3::new(max.x, min.y, max.z),
        Vector3::new(max.x, max.y, min.z),
        Vector3::new(max.x, max.y, max.z),
    ]
}

/// Anything with a world transform and a local bounding polyhedron.
pub trait Bounded {
    fn world_matrix(&self) -> Matrix4;
    fn local_corners(&self) -> [Vector3; 8];

    /// Full vertex list for meshes; None for objects that only have a box.
    fn local_vertices(&self) -> Option<&[Vector3]> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsSource {
    /// Transform the 8 local bounding corners of each object.
    #[default]
    Corners,
    /// Transform every mesh vertex, corners for objects without vertices.
    Vertices,
}

/// Box around `points` mapped through `mat`. None for no points.
fn transformed_points_bbox<'p, I>(mat: &Matrix4, points: I) -> Option<BBox>
where
    I: IntoIterator<Item = &'p Vector3>,
{
    let mut points = points.into_iter().map(|p| transform_point(mat, p));
    let mut bbox = BBox::from_point(points.next()?);
    for p in points {
        bbox.expand(&p);
    }
    Some(bbox)
}

/// World-space AABB of a single object.
pub fn world_bbox<B: Bounded + ?Sized>(obj: &B, source: BoundsSource) -> BBox {
    let mat = obj.world_matrix();
    let from_vertices = match (source, obj.local_vertices()) {
        (BoundsSource::Vertices, Some(verts)) => transformed_points_bbox(&mat, verts),
        _ => None,
    };
    // Corners are never empty, so this always yields a box
    from_vertices
        .or_else(|| transformed_points_bbox(&mat, obj.local_corners().iter()))
        .unwrap_or_else(|| BBox::from_point(transform_point(&mat, &Vector3::ZERO)))
}

/// World-space AABB of every object's 8 local corners. None for no objects.
pub fn compute_aabb<'a, B, I>(objects: I) -> Option<BBox>
where
    B: Bounded + ?Sized + 'a,
    I: IntoIterator<Item = &'a B>,
{
    compute_aabb_from(objects, BoundsSource::Corners)
}

pub fn compute_aabb_from<'a, B, I>(objects: I, source: BoundsSource) -> Option<BBox>
where
    B: Bounded + ?Sized + 'a,
    I: IntoIterator<Item = &'a B>,
{
    let mut count = 0;
    let bbox = objects
        .into_iter()
        .map(|obj| {
            count += 1;
            world_bbox(obj, source)
        })
        .reduce(|acc, b| acc.union(&b));

    debug!("Computed extent over {} objects: {:?}", count, bbox);
    bbox
}
