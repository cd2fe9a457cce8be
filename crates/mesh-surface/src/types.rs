//! Core surface data types.

use nalgebra::{Point3, Vector2, Vector3};

/// A vertex on a surface with optional per-vertex attributes.
///
/// The library is unit-agnostic; positions are whatever the source asset uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,

    /// Authored or computed vertex normal.
    pub normal: Option<Vector3<f64>>,

    /// Texture coordinate.
    pub uv: Option<Vector2<f64>>,
}

impl Vertex {
    /// Create a new vertex with only position set.
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
            uv: None,
        }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Attach a texture coordinate.
    #[inline]
    pub fn with_uv(mut self, u: f64, v: f64) -> Self {
        self.uv = Some(Vector2::new(u, v));
        self
    }
}

/// One indexed triangle surface of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is [v0, v1, v2] with counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,
}

impl Surface {
    /// Create a new empty surface.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a surface with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Number of vertices on the surface.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces (triangles) on the surface.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if surface is empty (no vertices or faces).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Compute the axis-aligned bounding box.
    /// Returns (min_corner, max_corner) or None if there are no vertices.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let (mut min, mut max) = (first, first);

        for vertex in &self.vertices[1..] {
            let p = &vertex.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }

    /// Get a specific triangle by face index.
    ///
    /// Returns None if the face or any of its vertex indices is out of range.
    pub fn triangle(&self, face_idx: usize) -> Option<Triangle> {
        let &[i0, i1, i2] = self.faces.get(face_idx)?;
        Some(Triangle {
            v0: self.vertices.get(i0 as usize)?.position,
            v1: self.vertices.get(i1 as usize)?.position,
            v2: self.vertices.get(i2 as usize)?.position,
        })
    }

    /// Iterate over texture coordinates, one entry per vertex.
    pub fn uvs(&self) -> impl Iterator<Item = Option<Vector2<f64>>> + '_ {
        self.vertices.iter().map(|v| v.uv)
    }

    /// Translate every vertex by the given vector.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

/// A source mesh made of one or more surfaces, as handed over by scene discovery.
///
/// Surfaces keep their original order; the index of a surface in `surfaces`
/// is the index an allow list refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetMesh {
    /// Human-readable name (node or file name).
    pub name: String,

    /// Surfaces in authoring order.
    pub surfaces: Vec<Surface>,
}

impl TargetMesh {
    /// Create a named target mesh.
    pub fn new(name: impl Into<String>, surfaces: Vec<Surface>) -> Self {
        Self {
            name: name.into(),
            surfaces,
        }
    }

    /// Number of surfaces.
    #[inline]
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Get a surface by index.
    #[inline]
    pub fn surface(&self, index: usize) -> Option<&Surface> {
        self.surfaces.get(index)
    }

    /// Total vertex count across all surfaces.
    pub fn vertex_count(&self) -> usize {
        self.surfaces.iter().map(Surface::vertex_count).sum()
    }

    /// Total face count across all surfaces.
    pub fn face_count(&self) -> usize {
        self.surfaces.iter().map(Surface::face_count).sum()
    }
}

/// A triangle with concrete vertex positions.
///
/// Utility type for geometric calculations. Winding is counter-clockwise
/// when viewed from the front (normal points toward viewer).
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) face normal via cross product.
    /// The direction follows the right-hand rule with CCW winding.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    /// Returns None for degenerate triangles (zero area).
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON * f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Compute the area of the triangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Check if the triangle is degenerate (zero or near-zero area).
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.area() < epsilon
    }
}
