//! Polygon fill tessellation
//!
//! The solid interior of a glyph is handed to a [`Tessellator`] as a set of
//! closed polygons whose vertices carry 16-bit point handles. Triangles come
//! back as handles. Vertices the tessellator has to invent (edge
//! intersections) are requested from a [`VertexSink`], which decides the
//! handle for them.

use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    FillGeometryBuilder, FillOptions, FillRule, FillTessellator, FillVertex, GeometryBuilder,
    GeometryBuilderError, VertexId, VertexSource,
};

use crate::core::errors::TriangulateError;
use crate::geometry::point::EmPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonVertex {
    pub handle: u16,
    pub position: EmPoint,
}

/// Closed contours sharing one vertex buffer
#[derive(Debug, Clone, Default)]
pub struct Polygon {
    vertices: Vec<PolygonVertex>,
    contour_ends: Vec<usize>,
}

impl Polygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.contour_ends.clear();
    }

    pub fn push_vertex(&mut self, handle: u16, position: EmPoint) {
        self.vertices.push(PolygonVertex { handle, position });
    }

    /// Finish the contour made of the vertices pushed since the last close.
    /// Empty contours are dropped.
    pub fn close_contour(&mut self) {
        let start = self.contour_ends.last().copied().unwrap_or(0);
        if self.vertices.len() > start {
            self.contour_ends.push(self.vertices.len());
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_contours(&self) -> usize {
        self.contour_ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contour_ends.is_empty()
    }

    pub fn contours(&self) -> impl Iterator<Item = &[PolygonVertex]> + '_ {
        let mut start = 0;
        self.contour_ends.iter().map(move |&end| {
            let contour = &self.vertices[start..end];
            start = end;
            contour
        })
    }
}

/// Hands out handles for vertices created during tessellation
pub trait VertexSink {
    /// A new vertex at `position`; `None` when no more handles are available
    fn combine(&mut self, position: EmPoint) -> Option<u16>;
}

/// Fills a [`Polygon`] under the non-zero winding rule
pub trait Tessellator {
    /// Append the triangles covering `polygon` to `out`, three handles each
    fn tessellate(
        &mut self,
        polygon: &Polygon,
        sink: &mut dyn VertexSink,
        out: &mut Vec<u16>,
    ) -> Result<(), TriangulateError>;
}

/// [`Tessellator`] backed by lyon's sweep-line fill tessellator
pub struct LyonTessellator {
    tessellator: FillTessellator,
    options: FillOptions,
    handles: Vec<u16>,
}

impl Default for LyonTessellator {
    fn default() -> Self {
        Self::new()
    }
}

impl LyonTessellator {
    pub fn new() -> Self {
        Self {
            tessellator: FillTessellator::new(),
            options: FillOptions::default().with_fill_rule(FillRule::NonZero),
            handles: Vec::new(),
        }
    }

    /// Build a lyon path, remembering the handle of every endpoint id
    fn build_path(&mut self, polygon: &Polygon) -> Path {
        self.handles.clear();
        let mut builder = Path::builder();
        for contour in polygon.contours() {
            let Some((first, rest)) = contour.split_first() else {
                continue;
            };
            let id = builder.begin(point(first.position[0], first.position[1]));
            self.record(id.0 as usize, first.handle);
            for vertex in rest {
                let id = builder.line_to(point(vertex.position[0], vertex.position[1]));
                self.record(id.0 as usize, vertex.handle);
            }
            builder.end(true);
        }
        builder.build()
    }

    fn record(&mut self, endpoint: usize, handle: u16) {
        if self.handles.len() <= endpoint {
            self.handles.resize(endpoint + 1, 0);
        }
        self.handles[endpoint] = handle;
    }
}

impl Tessellator for LyonTessellator {
    fn tessellate(
        &mut self,
        polygon: &Polygon,
        sink: &mut dyn VertexSink,
        out: &mut Vec<u16>,
    ) -> Result<(), TriangulateError> {
        if polygon.is_empty() {
            return Ok(());
        }
        let path = self.build_path(polygon);

        let mut output = HandleOutput {
            handles: &self.handles,
            sink,
            out,
            exhausted: false,
        };
        let result = self.tessellator.tessellate_with_ids(
            path.id_iter(),
            &path,
            None,
            &self.options,
            &mut output,
        );

        if output.exhausted {
            return Err(TriangulateError::PointsLimit);
        }
        result.map_err(|e| TriangulateError::Tessellation(format!("{e:?}")))
    }
}

/// Geometry builder that emits point handles instead of vertex data
struct HandleOutput<'a, 's> {
    handles: &'a [u16],
    sink: &'a mut (dyn VertexSink + 's),
    out: &'a mut Vec<u16>,
    exhausted: bool,
}

impl GeometryBuilder for HandleOutput<'_, '_> {
    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
        self.out.extend([a.0 as u16, b.0 as u16, c.0 as u16]);
    }
}

impl FillGeometryBuilder for HandleOutput<'_, '_> {
    fn add_fill_vertex(&mut self, vertex: FillVertex) -> Result<VertexId, GeometryBuilderError> {
        let endpoint = vertex.sources().find_map(|source| match source {
            VertexSource::Endpoint { id } => self.handles.get(id.0 as usize).copied(),
            _ => None,
        });
        if let Some(handle) = endpoint {
            return Ok(VertexId(handle as u32));
        }

        let position = vertex.position();
        match self.sink.combine([position.x, position.y]) {
            Some(handle) => Ok(VertexId(handle as u32)),
            None => {
                self.exhausted = true;
                Err(GeometryBuilderError::TooManyVertices)
            }
        }
    }
}
