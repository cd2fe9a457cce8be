//! Mesh file I/O for OBJ and STL formats.
//!
//! OBJ files map each object/group to one [`Surface`] and keep texture
//! coordinates; STL files always load as a single surface without UVs.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::{Vector2, Vector3};
use tracing::{debug, info, warn};

use crate::error::{MeshError, MeshResult};
use crate::{Surface, TargetMesh, Vertex};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
}

impl MeshFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "stl" => Some(MeshFormat::Stl),
                "obj" => Some(MeshFormat::Obj),
                _ => None,
            })
    }
}

fn unsupported(path: &Path) -> MeshError {
    MeshError::UnsupportedFormat {
        extension: path.extension().and_then(|e| e.to_str()).map(String::from),
    }
}

fn write_err(path: &Path) -> impl Fn(std::io::Error) -> MeshError + '_ {
    move |e| MeshError::IoWrite {
        path: path.to_path_buf(),
        source: e,
    }
}

/// Load a target mesh from file, auto-detecting format from extension.
///
/// The target is named after the file stem.
pub fn load_target(path: &Path) -> MeshResult<TargetMesh> {
    let format = MeshFormat::from_path(path).ok_or_else(|| unsupported(path))?;

    info!("Loading mesh from {:?} (format: {:?})", path, format);

    let surfaces = match format {
        MeshFormat::Stl => vec![load_stl(path)?],
        MeshFormat::Obj => load_obj(path)?,
    };

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh")
        .to_string();
    let target = TargetMesh::new(name, surfaces);

    if target.vertex_count() == 0 || target.face_count() == 0 {
        return Err(MeshError::EmptyMesh {
            details: "mesh has no vertices or faces".to_string(),
        });
    }

    info!(
        "Loaded '{}': {} surfaces, {} vertices, {} faces",
        target.name,
        target.surface_count(),
        target.vertex_count(),
        target.face_count()
    );

    Ok(target)
}

/// Load a single surface from STL file (binary or ASCII).
fn load_stl(path: &Path) -> MeshResult<Surface> {
    let file = File::open(path).map_err(|e| MeshError::IoRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut reader = BufReader::new(file);

    let stl = stl_io::read_stl(&mut reader).map_err(|e| MeshError::ParseError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    debug!(
        "STL contains {} vertices, {} triangles",
        stl.vertices.len(),
        stl.faces.len()
    );

    let mut surface = Surface::with_capacity(stl.vertices.len(), stl.faces.len());

    for v in &stl.vertices {
        surface.vertices.push(Vertex::from_coords(
            v.0[0] as f64,
            v.0[1] as f64,
            v.0[2] as f64,
        ));
    }

    let mut skipped = 0usize;
    for face in &stl.faces {
        let indices = [
            face.vertices[0] as u32,
            face.vertices[1] as u32,
            face.vertices[2] as u32,
        ];

        if indices[0] != indices[1] && indices[1] != indices[2] && indices[0] != indices[2] {
            surface.faces.push(indices);
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        warn!("Skipped {} collapsed STL triangles", skipped);
    }

    Ok(surface)
}

/// Load every OBJ model as its own surface.
fn load_obj(path: &Path) -> MeshResult<Vec<Surface>> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| MeshError::ParseError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    if models.is_empty() {
        return Err(MeshError::EmptyMesh {
            details: "OBJ file contains no models".to_string(),
        });
    }

    let mut surfaces = Vec::with_capacity(models.len());

    for model in &models {
        let obj_mesh = &model.mesh;
        let vertex_count = obj_mesh.positions.len() / 3;
        let has_uvs = obj_mesh.texcoords.len() / 2 == vertex_count && vertex_count > 0;
        let has_normals = obj_mesh.normals.len() / 3 == vertex_count && vertex_count > 0;

        let mut surface = Surface::with_capacity(vertex_count, obj_mesh.indices.len() / 3);

        for (i, chunk) in obj_mesh.positions.chunks_exact(3).enumerate() {
            let mut vertex =
                Vertex::from_coords(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            if has_uvs {
                vertex.uv = Some(Vector2::new(
                    obj_mesh.texcoords[2 * i] as f64,
                    obj_mesh.texcoords[2 * i + 1] as f64,
                ));
            }
            if has_normals {
                vertex.normal = Some(Vector3::new(
                    obj_mesh.normals[3 * i] as f64,
                    obj_mesh.normals[3 * i + 1] as f64,
                    obj_mesh.normals[3 * i + 2] as f64,
                ));
            }
            surface.vertices.push(vertex);
        }

        for chunk in obj_mesh.indices.chunks_exact(3) {
            surface.faces.push([chunk[0], chunk[1], chunk[2]]);
        }

        debug!(
            "OBJ model '{}': {} vertices, {} faces, uvs={}",
            model.name,
            surface.vertex_count(),
            surface.face_count(),
            has_uvs
        );

        surfaces.push(surface);
    }

    Ok(surfaces)
}

/// Save a target mesh, auto-detecting format from extension.
///
/// STL output flattens all surfaces and drops UVs.
pub fn save_target(target: &TargetMesh, path: &Path) -> MeshResult<()> {
    let format = MeshFormat::from_path(path).ok_or_else(|| unsupported(path))?;

    match format {
        MeshFormat::Stl => save_stl(target, path),
        MeshFormat::Obj => save_obj(target, path),
    }
}

/// Save all surfaces to a binary STL file.
pub fn save_stl(target: &TargetMesh, path: &Path) -> MeshResult<()> {
    info!("Saving mesh to {:?}", path);

    let file = File::create(path).map_err(write_err(path))?;
    let mut writer = BufWriter::new(file);

    let to_stl = |p: &nalgebra::Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);

    let mut triangles = Vec::with_capacity(target.face_count());
    for surface in &target.surfaces {
        for f in 0..surface.face_count() {
            let Some(tri) = surface.triangle(f) else {
                warn!("Skipping face {} with out-of-range indices", f);
                continue;
            };
            triangles.push(stl_io::Triangle {
                normal: stl_io::Normal::new([0.0, 0.0, 0.0]), // Readers recompute
                vertices: [to_stl(&tri.v0), to_stl(&tri.v1), to_stl(&tri.v2)],
            });
        }
    }

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(write_err(path))?;
    writer.flush().map_err(write_err(path))?;

    info!("Saved {} triangles to {:?}", triangles.len(), path);

    Ok(())
}

/// Save a target mesh to OBJ, one `o` block per surface.
///
/// Vertex order and face indices are preserved exactly. Texture coordinates
/// and normals are written when every vertex of the surface has them.
pub fn save_obj(target: &TargetMesh, path: &Path) -> MeshResult<()> {
    info!("Saving mesh to {:?} (OBJ format)", path);

    let file = File::create(path).map_err(write_err(path))?;
    let mut writer = BufWriter::new(file);
    write_obj(target, &mut writer).map_err(write_err(path))?;
    writer.flush().map_err(write_err(path))?;

    info!(
        "Saved {} surfaces, {} vertices and {} faces to {:?}",
        target.surface_count(),
        target.vertex_count(),
        target.face_count(),
        path
    );

    Ok(())
}

fn write_obj(target: &TargetMesh, writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer, "# OBJ file exported by mesh-surface")?;
    writeln!(writer, "# Surfaces: {}", target.surface_count())?;

    // OBJ indices are 1-based and global across objects
    let mut base = 1u32;

    for (s, surface) in target.surfaces.iter().enumerate() {
        let has_uvs = !surface.vertices.is_empty() && surface.vertices.iter().all(|v| v.uv.is_some());
        let has_normals =
            !surface.vertices.is_empty() && surface.vertices.iter().all(|v| v.normal.is_some());

        writeln!(writer)?;
        writeln!(writer, "o {}_surface_{}", target.name, s)?;

        for v in &surface.vertices {
            writeln!(writer, "v {:.6} {:.6} {:.6}", v.position.x, v.position.y, v.position.z)?;
        }
        if has_uvs {
            for uv in surface.vertices.iter().filter_map(|v| v.uv) {
                writeln!(writer, "vt {:.6} {:.6}", uv.x, uv.y)?;
            }
        }
        if has_normals {
            for n in surface.vertices.iter().filter_map(|v| v.normal) {
                writeln!(writer, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
            }
        }

        for face in &surface.faces {
            let [i0, i1, i2] = face.map(|i| i + base);
            match (has_uvs, has_normals) {
                (true, true) => writeln!(writer, "f {0}/{0}/{0} {1}/{1}/{1} {2}/{2}/{2}", i0, i1, i2)?,
                (true, false) => writeln!(writer, "f {0}/{0} {1}/{1} {2}/{2}", i0, i1, i2)?,
                (false, true) => writeln!(writer, "f {0}//{0} {1}//{1} {2}//{2}", i0, i1, i2)?,
                (false, false) => writeln!(writer, "f {} {} {}", i0, i1, i2)?,
            }
        }

        base += surface.vertex_count() as u32;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_stl() -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".stl").unwrap();

        // ASCII STL with a single triangle
        writeln!(file, "solid test").unwrap();
        writeln!(file, "  facet normal 0 0 1").unwrap();
        writeln!(file, "    outer loop").unwrap();
        writeln!(file, "      vertex 0 0 0").unwrap();
        writeln!(file, "      vertex 1 0 0").unwrap();
        writeln!(file, "      vertex 0 1 0").unwrap();
        writeln!(file, "    endloop").unwrap();
        writeln!(file, "  endfacet").unwrap();
        writeln!(file, "endsolid test").unwrap();

        file
    }

    fn uv_quad() -> Surface {
        let mut surface = Surface::new();
        surface.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0).with_uv(0.0, 0.0));
        surface.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0).with_uv(1.0, 0.0));
        surface.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0).with_uv(1.0, 1.0));
        surface.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0).with_uv(0.0, 1.0));
        surface.faces.push([0, 1, 2]);
        surface.faces.push([0, 2, 3]);
        surface
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            MeshFormat::from_path(Path::new("test.stl")),
            Some(MeshFormat::Stl)
        );
        assert_eq!(
            MeshFormat::from_path(Path::new("test.OBJ")),
            Some(MeshFormat::Obj)
        );
        assert_eq!(MeshFormat::from_path(Path::new("test.3mf")), None);
    }

    #[test]
    fn test_load_stl_as_single_surface() {
        let file = create_test_stl();
        let target = load_target(file.path()).expect("should load");

        assert_eq!(target.surface_count(), 1);
        assert_eq!(target.vertex_count(), 3);
        assert_eq!(target.face_count(), 1);

        let (min, max) = target.surfaces[0].bounds().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_target(Path::new("fur.ply")).unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_obj_keeps_surfaces_uvs_and_order() {
        let mut second = uv_quad();
        second.translate(Vector3::new(0.0, 0.0, 2.0));
        let target = TargetMesh::new("pelt", vec![uv_quad(), second]);

        let file = NamedTempFile::with_suffix(".obj").unwrap();
        save_obj(&target, file.path()).expect("should save");
        let reloaded = load_target(file.path()).expect("should reload");

        assert_eq!(reloaded.surface_count(), 2);
        for (orig, loaded) in target.surfaces.iter().zip(&reloaded.surfaces) {
            assert_eq!(orig.faces, loaded.faces);
            assert_eq!(orig.vertex_count(), loaded.vertex_count());
            for (a, b) in orig.vertices.iter().zip(&loaded.vertices) {
                assert!((a.position - b.position).norm() < 1e-5);
                let (ua, ub) = (a.uv.unwrap(), b.uv.expect("uv survives"));
                assert!((ua - ub).norm() < 1e-5);
            }
        }
    }

    #[test]
    fn test_save_and_reload_stl() {
        let target = TargetMesh::new("quad", vec![uv_quad()]);
        let file = NamedTempFile::with_suffix(".stl").unwrap();
        save_target(&target, file.path()).expect("should save");

        let reloaded = load_target(file.path()).expect("should reload");
        assert_eq!(reloaded.face_count(), 2);
        assert_eq!(reloaded.vertex_count(), 4);
        assert!(reloaded.surfaces[0].vertices.iter().all(|v| v.uv.is_none()));
    }
}
