//! Glyph outline triangulation
//!
//! A simple glyph's contours become two triangle lists over one point array:
//! curve triangles (one per quadratic segment, shaded analytically on the GPU)
//! followed by solid triangles covering the interior. See [`contour`] for the
//! individual passes and [`tessellator`] for the fill backend.

pub mod contour;
pub mod tessellator;

use rayon::prelude::*;
use tracing::{debug, info_span, warn};

use crate::core::errors::{FontError, FontResult, TriangulateError};
use crate::data::NodeId;
use crate::font_source::glyph::GlyphTriangles;
use crate::geometry::utilities::{point_in_polygon, signed_area};
use crate::io::{DecodedGlyph, LoadOptions, Outline};

use contour::{Contour, PointArena, MAX_REPAIR_DEPTH};
pub use tessellator::{LyonTessellator, Polygon, Tessellator, VertexSink};

/// Fonts with more glyphs than this are triangulated in parallel when enabled
pub const PARALLEL_THRESHOLD: usize = 20;

/// Reusable triangulation state
///
/// One instance triangulates any number of glyphs, one at a time. Parallel
/// callers give every worker its own.
pub struct Triangulator<T: Tessellator = LyonTessellator> {
    tessellator: T,
    max_points: usize,
    max_indices: usize,
    polygon: Polygon,
    curves: Vec<[NodeId; 3]>,
}

impl Triangulator<LyonTessellator> {
    pub fn new(options: &LoadOptions) -> Self {
        Self::with_tessellator(
            LyonTessellator::new(),
            options.point_capacity(),
            options.max_glyph_indices,
        )
    }
}

impl<T: Tessellator> Triangulator<T> {
    pub fn with_tessellator(tessellator: T, max_points: usize, max_indices: usize) -> Self {
        Self {
            tessellator,
            max_points,
            max_indices,
            polygon: Polygon::new(),
            curves: Vec::new(),
        }
    }

    /// Triangulate one simple glyph
    pub fn triangulate(&mut self, outline: &Outline) -> Result<GlyphTriangles, TriangulateError> {
        let num_orig = outline.num_points();
        if num_orig > self.max_points {
            return Err(TriangulateError::PointsLimit);
        }
        if outline.num_contours() == 0 || num_orig == 0 {
            return Ok(GlyphTriangles::default());
        }

        let mut arena = PointArena::new(self.max_points, &outline.points, &outline.flags);
        let mut contours = self.build_contours(outline, &mut arena)?;

        for contour in contours.iter_mut() {
            contour.split_consecutive_off_curve(&mut arena)?;
        }
        let mut unresolved = 0;
        for contour in contours.iter_mut() {
            unresolved += contour.repair_overlaps(
                &mut arena,
                &outline.points,
                &mut self.curves,
                MAX_REPAIR_DEPTH,
            )?;
        }
        if unresolved > 0 {
            warn!(
                "{unresolved} curve pieces still overlap the outline after {MAX_REPAIR_DEPTH} subdivisions"
            );
        }

        let mut indices = Vec::new();
        indices.try_reserve_exact(self.max_indices.min(4 * num_orig))?;
        for contour in contours.iter_mut() {
            contour.emit_curves(&mut arena, &mut indices, self.max_indices)?;
        }
        let num_indices_curve = indices.len();

        self.polygon.clear();
        for contour in &contours {
            contour.push_solid(&arena, &mut self.polygon);
        }
        self.tessellator
            .tessellate(&self.polygon, &mut arena, &mut indices)?;
        if indices.len() > self.max_indices {
            return Err(TriangulateError::IndicesLimit);
        }

        let num_points = arena.pool.high_water_mark();
        arena.points.truncate(num_points);
        arena.flags.truncate(num_points);

        debug!(
            "Triangulated {} contours: {} points ({} generated), {} curve / {} solid indices",
            contours.len(),
            num_points,
            num_points - num_orig,
            num_indices_curve,
            indices.len() - num_indices_curve
        );

        Ok(GlyphTriangles {
            points: arena.points,
            flags: arena.flags,
            indices,
            num_points_orig: num_orig,
            num_indices_curve,
        })
    }

    /// Link each contour's points and classify winding and holes against the
    /// untouched outline
    fn build_contours(
        &self,
        outline: &Outline,
        arena: &mut PointArena,
    ) -> Result<Vec<Contour>, TriangulateError> {
        let num_points = outline.num_points();
        let ranges: Vec<_> = outline.contour_ranges().collect();

        for (contour, range) in ranges.iter().enumerate() {
            if range.is_empty() || range.end > num_points {
                return Err(TriangulateError::EmptyContour { contour });
            }
            if !range.clone().any(|i| outline.is_on_curve(i)) {
                return Err(TriangulateError::NoOnCurvePoint { contour });
            }
        }

        let mut contours = Vec::new();
        contours.try_reserve_exact(ranges.len())?;
        for (c, range) in ranges.iter().enumerate() {
            let points = &outline.points[range.clone()];
            let clockwise = signed_area(points) < 0.0;

            // Inside an odd number of other contours means hole
            let is_hole = ranges
                .iter()
                .enumerate()
                .filter(|&(d, _)| d != c)
                .fold(false, |hole, (_, other)| {
                    let polygon = &outline.points[other.clone()];
                    hole ^ points.iter().all(|&p| point_in_polygon(polygon, p))
                });

            let list = arena.pool.list_from_range(range.start, range.end - 1);
            contours.push(Contour::new(list, clockwise, is_hole));
        }
        Ok(contours)
    }
}

/// Triangulate every simple glyph of `glyphs`, index-aligned with the input
///
/// Composite and absent glyphs yield `None`. The first failure aborts the
/// whole run and names the glyph.
pub fn triangulate_all(
    glyphs: &[Option<DecodedGlyph>],
    options: &LoadOptions,
) -> FontResult<Vec<Option<GlyphTriangles>>> {
    let run = |triangulator: &mut Triangulator, (index, glyph): (usize, &Option<DecodedGlyph>)| {
        match glyph {
            Some(DecodedGlyph::Simple(outline)) => {
                // Gives the warnings raised while triangulating their glyph index
                let _span = info_span!("glyph", index).entered();
                triangulator
                    .triangulate(outline)
                    .map(Some)
                    .map_err(|source| FontError::Triangulate {
                        glyph: index as u32,
                        source,
                    })
            }
            _ => Ok(None),
        }
    };

    if options.parallel && glyphs.len() > PARALLEL_THRESHOLD {
        debug!(
            "Triangulating {} glyphs on {} threads",
            glyphs.len(),
            rayon::current_num_threads()
        );
        glyphs
            .par_iter()
            .enumerate()
            .map_init(|| Triangulator::new(options), run)
            .collect()
    } else {
        let mut triangulator = Triangulator::new(options);
        glyphs
            .iter()
            .enumerate()
            .map(|item| run(&mut triangulator, item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::glyf::point_flags::{CONVEX, CORNER_TAG, ON_CURVE};

    fn outline(contours: &[&[(f32, f32, bool)]]) -> Outline {
        let mut out = Outline::default();
        for contour in contours {
            for &(x, y, on) in contour.iter() {
                out.points.push([x, y]);
                out.flags.push(on as u32);
            }
            out.end_points.push(out.points.len() as u16 - 1);
        }
        out
    }

    fn triangulator() -> Triangulator {
        Triangulator::new(&LoadOptions::default())
    }

    fn assert_well_formed(mesh: &GlyphTriangles) {
        assert_eq!(mesh.num_indices_curve % 3, 0);
        assert_eq!(mesh.num_indices_solid() % 3, 0);
        assert_eq!(mesh.points.len(), mesh.flags.len());
        assert!(mesh.points.len() >= mesh.num_points_orig);
        assert!(mesh
            .indices
            .iter()
            .all(|&i| (i as usize) < mesh.points.len()));
    }

    #[test]
    fn test_square_has_only_solid_triangles() {
        let square = outline(&[&[
            (0.0, 0.0, true),
            (1.0, 0.0, true),
            (1.0, 1.0, true),
            (0.0, 1.0, true),
        ]]);
        let mesh = triangulator().triangulate(&square).unwrap();

        assert_well_formed(&mesh);
        assert_eq!(mesh.num_indices_curve, 0);
        assert_eq!(mesh.num_indices_solid(), 6);
        assert_eq!(mesh.num_points_total(), 4);
    }

    #[test]
    fn test_convex_bump_is_one_curve_triangle() {
        let bump = outline(&[&[(0.0, 0.0, true), (0.5, 1.0, false), (1.0, 0.0, true)]]);
        let mesh = triangulator().triangulate(&bump).unwrap();

        assert_well_formed(&mesh);
        assert_eq!(mesh.num_indices_curve, 3);
        assert_eq!(mesh.curve_indices()[2], 1);
        assert_eq!(mesh.flags[0], CORNER_TAG | ON_CURVE);
        assert_eq!(mesh.flags[2], ON_CURVE);
        // The control point bounds the solid area only for concave curves
        let convex = mesh.flags[1] & CONVEX != 0;
        let in_solid = mesh.solid_indices().contains(&1);
        assert_ne!(convex, in_solid);
    }

    #[test]
    fn test_ring_with_hole_keeps_hole_empty() {
        let ring = outline(&[
            &[(0.0, 0.0, true), (1.0, 0.0, true), (1.0, 1.0, true), (0.0, 1.0, true)],
            &[
                (0.25, 0.25, true),
                (0.25, 0.75, true),
                (0.75, 0.75, true),
                (0.75, 0.25, true),
            ],
        ]);
        let mesh = triangulator().triangulate(&ring).unwrap();

        assert_well_formed(&mesh);
        assert_eq!(mesh.num_indices_curve, 0);
        // A square ring is eight triangles
        assert_eq!(mesh.num_indices_solid(), 24);
    }

    #[test]
    fn test_empty_outline_is_empty_mesh() {
        let mesh = triangulator().triangulate(&Outline::default()).unwrap();
        assert_eq!(mesh, GlyphTriangles::default());
    }

    #[test]
    fn test_all_off_curve_contour_is_rejected() {
        let circle = outline(&[&[
            (0.0, 0.0, false),
            (1.0, 0.0, false),
            (1.0, 1.0, false),
        ]]);
        assert!(matches!(
            triangulator().triangulate(&circle),
            Err(TriangulateError::NoOnCurvePoint { contour: 0 })
        ));
    }

    #[test]
    fn test_decreasing_end_point_is_empty_contour() {
        let mut bad = outline(&[&[(0.0, 0.0, true), (1.0, 0.0, true), (1.0, 1.0, true)]]);
        bad.end_points.push(1);
        assert!(matches!(
            triangulator().triangulate(&bad),
            Err(TriangulateError::EmptyContour { contour: 1 })
        ));
    }

    #[test]
    fn test_too_many_points_is_points_limit() {
        let square = outline(&[&[
            (0.0, 0.0, true),
            (1.0, 0.0, true),
            (1.0, 1.0, true),
            (0.0, 1.0, true),
        ]]);
        let mut small = Triangulator::with_tessellator(LyonTessellator::new(), 3, 64);
        assert!(matches!(
            small.triangulate(&square),
            Err(TriangulateError::PointsLimit)
        ));
    }

    #[test]
    fn test_too_many_indices_is_indices_limit() {
        let square = outline(&[&[
            (0.0, 0.0, true),
            (1.0, 0.0, true),
            (1.0, 1.0, true),
            (0.0, 1.0, true),
        ]]);
        let mut small = Triangulator::with_tessellator(LyonTessellator::new(), 64, 3);
        assert!(matches!(
            small.triangulate(&square),
            Err(TriangulateError::IndicesLimit)
        ));
    }

    #[test]
    fn test_implied_midpoints_become_points() {
        // Two consecutive controls between on-curve corners
        let shape = outline(&[&[
            (0.0, 0.0, true),
            (0.0, 1.0, false),
            (1.0, 1.0, false),
            (1.0, 0.0, true),
        ]]);
        let mesh = triangulator().triangulate(&shape).unwrap();
        assert_well_formed(&mesh);
        assert_eq!(mesh.num_points_orig, 4);
        assert_eq!(mesh.points[4], [0.5, 1.0]);
        assert_eq!(mesh.num_indices_curve, 6);
    }

    struct RecordingTessellator {
        submitted: Vec<Vec<u16>>,
    }

    impl Tessellator for RecordingTessellator {
        fn tessellate(
            &mut self,
            polygon: &Polygon,
            _sink: &mut dyn VertexSink,
            _out: &mut Vec<u16>,
        ) -> Result<(), TriangulateError> {
            self.submitted = polygon
                .contours()
                .map(|c| c.iter().map(|v| v.handle).collect())
                .collect();
            Ok(())
        }
    }

    #[test]
    fn test_convex_controls_are_left_out_of_the_solid_polygon() {
        let shape = outline(&[&[
            (0.0, 0.0, true),
            (0.5, -0.5, false),
            (1.0, 0.0, true),
            (1.0, 1.0, true),
            (0.0, 1.0, true),
        ]]);
        let recorder = RecordingTessellator {
            submitted: Vec::new(),
        };
        let mut t = Triangulator::with_tessellator(recorder, 64, 64);
        let mesh = t.triangulate(&shape).unwrap();

        let convex = mesh.flags[1] & CONVEX != 0;
        assert_eq!(t.tessellator.submitted.len(), 1);
        assert_eq!(t.tessellator.submitted[0].contains(&1), !convex);
    }

    #[test]
    fn test_triangulate_all_aligns_with_glyphs() {
        let square = outline(&[&[
            (0.0, 0.0, true),
            (1.0, 0.0, true),
            (1.0, 1.0, true),
            (0.0, 1.0, true),
        ]]);
        let glyphs = vec![
            None,
            Some(DecodedGlyph::Simple(square)),
            Some(DecodedGlyph::Composite(Vec::new())),
        ];
        let meshes = triangulate_all(&glyphs, &LoadOptions::default()).unwrap();
        assert_eq!(meshes.len(), 3);
        assert!(meshes[0].is_none());
        assert_eq!(meshes[1].as_ref().map(|m| m.num_indices_solid()), Some(6));
        assert!(meshes[2].is_none());
    }

    #[test]
    fn test_parallel_run_matches_sequential_and_reports_glyph() {
        let triangle = outline(&[&[(0.0, 0.0, true), (0.5, 1.0, false), (1.0, 0.0, true)]]);
        let mut glyphs: Vec<_> = (0..40)
            .map(|_| Some(DecodedGlyph::Simple(triangle.clone())))
            .collect();

        let sequential = triangulate_all(&glyphs, &LoadOptions::default()).unwrap();
        let parallel_options = LoadOptions {
            parallel: true,
            ..Default::default()
        };
        let parallel = triangulate_all(&glyphs, &parallel_options).unwrap();
        assert_eq!(sequential, parallel);

        glyphs[33] = Some(DecodedGlyph::Simple(outline(&[&[
            (0.0, 0.0, false),
            (1.0, 0.0, false),
            (1.0, 1.0, false),
        ]])));
        let err = triangulate_all(&glyphs, &parallel_options).unwrap_err();
        assert!(matches!(err, FontError::Triangulate { glyph: 33, .. }));
    }
}
