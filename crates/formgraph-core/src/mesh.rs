//! Mesh types and isosurface extraction
//!
//! Triangulation is delegated to `fast-surface-nets`; this module owns the
//! contract around it: initialize with a resolution, set the sampled field
//! (and optional colors), triangulate. Lattice-space vertex positions are
//! mapped back into world space using the field's bounds, and per-vertex
//! colors come from trilinear lookup into the color lattice.

use crate::sdf::Aabb;
use crate::voxel::VoxelField;
use crate::{Error, Result};
use fast_surface_nets::ndshape::Shape;
use fast_surface_nets::{SurfaceNetsBuffer, surface_nets};
use glam::Vec3;

/// A vertex with position, normal, and color
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color: color.to_array(),
        }
    }
}

/// A triangle mesh
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Calculate face normals and smooth them.
    ///
    /// Extraction already bakes gradient normals onto the vertices;
    /// this is for consumers that deform or weld the mesh afterwards
    /// and need normals rebuilt from the triangles alone.
    pub fn recalculate_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = [0.0, 0.0, 0.0];
        }

        for tri in self.indices.chunks(3) {
            let i0 = tri[0] as usize;
            let i1 = tri[1] as usize;
            let i2 = tri[2] as usize;

            let p0 = Vec3::from_array(self.vertices[i0].position);
            let p1 = Vec3::from_array(self.vertices[i1].position);
            let p2 = Vec3::from_array(self.vertices[i2].position);

            let face_normal = (p1 - p0).cross(p2 - p0);

            for &i in &[i0, i1, i2] {
                self.vertices[i].normal[0] += face_normal.x;
                self.vertices[i].normal[1] += face_normal.y;
                self.vertices[i].normal[2] += face_normal.z;
            }
        }

        for v in &mut self.vertices {
            let n = Vec3::from_array(v.normal).normalize_or_zero();
            v.normal = n.to_array();
        }
    }
}

/// Cubic lattice shape adapter for `fast-surface-nets`
#[derive(Clone, Copy)]
struct GridShape {
    n: u32,
}

impl Shape<3> for GridShape {
    type Coord = u32;

    #[inline]
    fn as_array(&self) -> [Self::Coord; 3] {
        [self.n, self.n, self.n]
    }

    fn size(&self) -> Self::Coord {
        self.n * self.n * self.n
    }

    fn usize(&self) -> usize {
        (self.n * self.n * self.n) as usize
    }

    fn linearize(&self, coords: [Self::Coord; 3]) -> u32 {
        let [x, y, z] = coords;
        (z * self.n + y) * self.n + x
    }

    fn delinearize(&self, i: u32) -> [Self::Coord; 3] {
        let x = i % self.n;
        let yz = i / self.n;
        let y = yz % self.n;
        let z = yz / self.n;
        [x, y, z]
    }
}

/// Isosurface extractor with reusable lattice-sized buffers.
///
/// The field handed to [`set_field`](Self::set_field) follows the sampler's
/// positive-inside convention; the extractor flips the sign internally since
/// the triangulation library wants negative-inside distances.
pub struct SurfaceExtractor {
    resolution: u32,
    bounds: Aabb,
    /// Negated field copy in the library's sign convention
    field: Vec<f32>,
    colors: Option<Vec<Vec3>>,
    buffer: SurfaceNetsBuffer,
}

impl SurfaceExtractor {
    /// Initialize for a lattice of `resolution` points per axis
    pub fn new(resolution: u32) -> Result<Self> {
        if resolution < 2 {
            return Err(Error::InvalidParameter(format!(
                "extraction resolution must be at least 2, got {resolution}"
            )));
        }
        let total = (resolution as usize).pow(3);
        Ok(Self {
            resolution,
            bounds: Aabb::cube(1.0),
            field: vec![1.0; total],
            colors: None,
            buffer: SurfaceNetsBuffer::default(),
        })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Store a sampled field for triangulation.
    ///
    /// A resolution different from the current one reinitializes the
    /// internal buffers.
    pub fn set_field(&mut self, values: &[f32], resolution: u32, bounds: Aabb) -> Result<()> {
        if resolution < 2 {
            return Err(Error::InvalidParameter(format!(
                "extraction resolution must be at least 2, got {resolution}"
            )));
        }
        let expected = (resolution as usize).pow(3);
        if values.len() != expected {
            return Err(Error::FieldSizeMismatch {
                expected,
                actual: values.len(),
            });
        }

        if resolution != self.resolution {
            self.resolution = resolution;
            self.field = Vec::with_capacity(expected);
            self.colors = None;
        } else {
            self.field.clear();
        }
        // Positive-inside in, negative-inside out
        self.field.extend(values.iter().map(|v| -v));
        self.bounds = bounds;
        Ok(())
    }

    /// Store optional per-lattice-point colors for the current field
    pub fn set_colors(&mut self, colors: Option<&[Vec3]>) -> Result<()> {
        match colors {
            None => self.colors = None,
            Some(c) => {
                let expected = (self.resolution as usize).pow(3);
                if c.len() != expected {
                    return Err(Error::FieldSizeMismatch {
                        expected,
                        actual: c.len(),
                    });
                }
                self.colors = Some(c.to_vec());
            }
        }
        Ok(())
    }

    /// Extract the isosurface of the stored field at isolevel 0
    pub fn triangulate(&mut self) -> Mesh {
        let n = self.resolution;
        let shape = GridShape { n };

        surface_nets(
            &self.field,
            &shape,
            [0, 0, 0],
            [n - 1, n - 1, n - 1],
            &mut self.buffer,
        );

        // Lattice spacing in world units
        let last = (n - 1) as f32;
        let step = self.bounds.size() / last;

        let mut mesh = Mesh::new();
        mesh.vertices.reserve(self.buffer.positions.len());
        for (pos, normal) in self.buffer.positions.iter().zip(&self.buffer.normals) {
            let lattice = Vec3::from_array(*pos);
            let world = self.bounds.min + lattice * step;
            let color = match &self.colors {
                Some(colors) => trilinear_color(colors, n, lattice),
                None => Vec3::ONE,
            };
            mesh.vertices.push(Vertex::new(
                world,
                Vec3::from_array(*normal).normalize_or_zero(),
                color,
            ));
        }
        mesh.indices.extend_from_slice(&self.buffer.indices);
        mesh
    }

    /// Convenience: set field + colors from a sampled [`VoxelField`] and
    /// triangulate in one go.
    pub fn extract(&mut self, field: &VoxelField) -> Result<Mesh> {
        self.set_field(&field.values, field.resolution, field.bounds)?;
        self.set_colors(field.colors.as_deref())?;
        Ok(self.triangulate())
    }
}

/// Trilinear interpolation into the color lattice at a fractional lattice
/// position
fn trilinear_color(colors: &[Vec3], n: u32, lattice: Vec3) -> Vec3 {
    let max = (n - 1) as f32;
    let clamped = lattice.clamp(Vec3::ZERO, Vec3::splat(max));
    let base = clamped.floor();
    let frac = clamped - base;

    let n = n as usize;
    let at = |x: usize, y: usize, z: usize| colors[(z * n + y) * n + x];
    let x0 = base.x as usize;
    let y0 = base.y as usize;
    let z0 = base.z as usize;
    let x1 = (x0 + 1).min(n - 1);
    let y1 = (y0 + 1).min(n - 1);
    let z1 = (z0 + 1).min(n - 1);

    let c00 = at(x0, y0, z0).lerp(at(x1, y0, z0), frac.x);
    let c10 = at(x0, y1, z0).lerp(at(x1, y1, z0), frac.x);
    let c01 = at(x0, y0, z1).lerp(at(x1, y0, z1), frac.x);
    let c11 = at(x0, y1, z1).lerp(at(x1, y1, z1), frac.x);
    let c0 = c00.lerp(c10, frac.y);
    let c1 = c01.lerp(c11, frac.y);
    c0.lerp(c1, frac.z)
}
