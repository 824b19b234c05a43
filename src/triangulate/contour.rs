//! Per-contour passes over the point arena
//!
//! Every contour is a cyclic list in one shared [`NodePool`]; a node handle is
//! also the index of its point in [`PointArena::points`]. New points (curve
//! splits, seam duplicates, tessellation intersections) come from the pool's
//! free list, so their handles continue after the decoded points.

use crate::core::errors::TriangulateError;
use crate::data::{ListHead, NodeId, NodePool};
use crate::geometry::point::{mid, EmPoint};
use crate::geometry::utilities::{ac_cross_ab, any_point_in_triangle};
use crate::io::glyf::point_flags::{CONVEX, CORNER_TAG, ON_CURVE};

use super::tessellator::{Polygon, VertexSink};

/// Subdivision depth for one curve whose control triangle overlaps the outline
pub const MAX_REPAIR_DEPTH: u32 = 8;

/// Point storage of one glyph while it is being triangulated
#[derive(Debug)]
pub struct PointArena {
    pub pool: NodePool,
    pub points: Vec<EmPoint>,
    pub flags: Vec<u32>,
    /// Vertices created by the tessellator, owned by no contour
    pub extra: ListHead,
}

impl PointArena {
    /// Arena of `capacity` slots whose first points are `points`
    pub fn new(capacity: usize, points: &[EmPoint], flags: &[u32]) -> Self {
        let mut arena = Self {
            pool: NodePool::new(capacity, points.len()),
            points: vec![[0.0; 2]; capacity],
            flags: vec![0; capacity],
            extra: ListHead::new(),
        };
        arena.points[..points.len()].copy_from_slice(points);
        for (slot, &flag) in arena.flags.iter_mut().zip(flags) {
            *slot = flag & ON_CURVE;
        }
        arena
    }

    #[inline]
    pub fn point(&self, node: NodeId) -> EmPoint {
        self.points[node.index()]
    }

    #[inline]
    pub fn is_on_curve(&self, node: NodeId) -> bool {
        self.flags[node.index()] & ON_CURVE != 0
    }

    /// New point linked into `list` right before `before`
    fn insert_point(
        &mut self,
        list: &mut ListHead,
        before: NodeId,
        position: EmPoint,
        flags: u32,
    ) -> Result<NodeId, TriangulateError> {
        let node = self
            .pool
            .insert_before(list, before)
            .ok_or(TriangulateError::PointsLimit)?;
        self.points[node.index()] = position;
        self.flags[node.index()] = flags;
        Ok(node)
    }
}

impl VertexSink for PointArena {
    fn combine(&mut self, position: EmPoint) -> Option<u16> {
        let mut extra = self.extra;
        let node = self.pool.push_back(&mut extra)?;
        self.extra = extra;
        self.points[node.index()] = position;
        self.flags[node.index()] = ON_CURVE;
        Some(node.into())
    }
}

/// Inputs shared by every level of one curve's subdivision
struct Repair<'a> {
    outline: &'a [EmPoint],
    skip: [usize; 3],
    max_depth: u32,
}

/// One closed contour of the glyph being triangulated
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: ListHead,
    pub clockwise: bool,
    pub is_hole: bool,
    /// On-curve copy of the start point closing the curve chain, if one was
    /// needed; it is not part of the solid outline.
    pub seam: Option<NodeId>,
}

impl Contour {
    pub fn new(points: ListHead, clockwise: bool, is_hole: bool) -> Self {
        Self {
            points,
            clockwise,
            is_hole,
            seam: None,
        }
    }

    /// Insert the implied on-curve midpoint between consecutive off-curve points
    pub fn split_consecutive_off_curve(
        &mut self,
        arena: &mut PointArena,
    ) -> Result<(), TriangulateError> {
        let Some(start) = self.points.root() else {
            return Ok(());
        };
        let mut a = start;
        loop {
            let b = arena.pool.next(a);
            if !arena.is_on_curve(a) && !arena.is_on_curve(b) {
                let position = mid(arena.point(a), arena.point(b));
                arena.insert_point(&mut self.points, b, position, ON_CURVE)?;
            }
            a = b;
            if a == start {
                return Ok(());
            }
        }
    }

    /// Subdivide curves whose control triangle contains a point of the outline
    ///
    /// `outline` holds the decoded points, which are the ones tested. Each
    /// curve is split at most `max_depth` levels deep; the return value counts
    /// the pieces that still overlap at that depth.
    pub fn repair_overlaps(
        &mut self,
        arena: &mut PointArena,
        outline: &[EmPoint],
        scratch: &mut Vec<[NodeId; 3]>,
        max_depth: u32,
    ) -> Result<usize, TriangulateError> {
        scratch.clear();
        scratch.extend(arena.pool.iter(&self.points).filter_map(|b| {
            let a = arena.pool.prev(b);
            let c = arena.pool.next(b);
            (a != c && arena.is_on_curve(a) && !arena.is_on_curve(b) && arena.is_on_curve(c))
                .then_some([a, b, c])
        }));

        let mut unresolved = 0;
        for &[a, b, c] in scratch.iter() {
            let repair = Repair {
                outline,
                skip: [a.index(), b.index(), c.index()],
                max_depth,
            };
            unresolved += self.subdivide(arena, &repair, a, b, c, 0)?;
        }
        Ok(unresolved)
    }

    fn subdivide(
        &mut self,
        arena: &mut PointArena,
        repair: &Repair<'_>,
        a: NodeId,
        b: NodeId,
        c: NodeId,
        depth: u32,
    ) -> Result<usize, TriangulateError> {
        let (pa, pb, pc) = (arena.point(a), arena.point(b), arena.point(c));
        if !any_point_in_triangle(repair.outline, &repair.skip, pa, pb, pc) {
            return Ok(0);
        }
        if depth >= repair.max_depth {
            return Ok(1);
        }

        // a f b g c: f and g become the new controls, b moves onto the curve
        let pf = mid(pa, pb);
        let pg = mid(pc, pb);
        let f = arena.insert_point(&mut self.points, b, pf, 0)?;
        let g = arena.insert_point(&mut self.points, c, pg, 0)?;
        arena.points[b.index()] = mid(pf, pg);
        arena.flags[b.index()] = ON_CURVE;

        Ok(self.subdivide(arena, repair, a, f, b, depth + 1)?
            + self.subdivide(arena, repair, b, g, c, depth + 1)?)
    }

    /// Emit one triangle per quadratic curve and tag its corners
    ///
    /// Corners alternate between the two [`CORNER_TAG`] states along the
    /// contour; the control point gets [`CONVEX`] when the curve bulges out of
    /// the filled area.
    pub fn emit_curves(
        &mut self,
        arena: &mut PointArena,
        out: &mut Vec<u16>,
        max_indices: usize,
    ) -> Result<(), TriangulateError> {
        if self.points.len() < 3 {
            return Ok(());
        }
        let Some(root) = arena
            .pool
            .iter(&self.points)
            .find(|&node| arena.is_on_curve(node))
        else {
            return Ok(());
        };
        self.points.set_root(root);

        let mut tag = CORNER_TAG;
        let mut root_tag = None;
        let mut node = root;
        loop {
            let mut next = arena.pool.next(node);
            if !arena.is_on_curve(node) {
                let prev = arena.pool.prev(node);

                // An odd number of curves would hand the start point a second,
                // different tag; close the chain on a copy of it instead.
                if next == root && root_tag.is_some_and(|t| t != tag ^ CORNER_TAG) {
                    let position = arena.point(root);
                    let seam = arena.insert_point(&mut self.points, root, position, ON_CURVE)?;
                    self.seam = Some(seam);
                    next = seam;
                }

                if out.len() + 3 > max_indices {
                    return Err(TriangulateError::IndicesLimit);
                }
                let is_clockwise =
                    ac_cross_ab(arena.point(prev), arena.point(node), arena.point(next)) > 0.0;
                let is_convex = (is_clockwise == self.clockwise) ^ self.is_hole;
                let (first, second) = if is_convex { (prev, next) } else { (next, prev) };
                out.extend([first.into(), second.into(), u16::from(node)]);

                arena.flags[prev.index()] = tag | ON_CURVE;
                if prev == root {
                    root_tag = Some(tag);
                }
                tag ^= CORNER_TAG;
                arena.flags[next.index()] = tag | ON_CURVE;
                arena.flags[node.index()] = if is_convex { CONVEX } else { 0 };
            }
            node = next;
            if node == root {
                return Ok(());
            }
        }
    }

    /// Add the solid outline: on-curve points and the controls of concave
    /// curves, which bound the filled area from inside
    pub fn push_solid(&self, arena: &PointArena, polygon: &mut Polygon) {
        if self.points.len() < 3 {
            return;
        }
        for node in arena.pool.iter(&self.points) {
            if Some(node) == self.seam {
                continue;
            }
            let flags = arena.flags[node.index()];
            if flags & ON_CURVE != 0 || flags & CONVEX == 0 {
                polygon.push_vertex(node.into(), arena.point(node));
            }
        }
        polygon.close_contour();
    }
}
