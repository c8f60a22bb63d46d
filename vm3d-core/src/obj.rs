//! Wavefront OBJ/MTL loader producing triangle-list mesh buffers
use std::collections::HashMap;
use std::path::Path;

use nom::{
    bytes::complete::tag,
    character::complete::{i64 as index, space1},
    combinator::{all_consuming, map, opt},
    multi::separated_list1,
    number::complete::float,
    sequence::{preceded, tuple},
    IResult,
};
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::mesh::{try_flat_normal, MeshBuffer};
use crate::vec::{Vec2f, Vec3f};

/// Vertex color for faces without a material.
pub const DEFAULT_COLOR: Vec3f = Vec3f::new(1.0, 1.0, 1.0);

/// Ambient colors keyed by material name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    ambient: HashMap<String, Vec3f>,
}

impl MaterialLibrary {
    pub fn insert(&mut self, name: impl Into<String>, ambient: Vec3f) {
        self.ambient.insert(name.into(), ambient);
    }

    pub fn get(&self, name: &str) -> Option<Vec3f> {
        self.ambient.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.ambient.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ambient.is_empty()
    }

    pub fn extend(&mut self, other: MaterialLibrary) {
        self.ambient.extend(other.ambient);
    }
}

/// One face corner: 1-based (or negative, end-relative) attribute indices.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Corner {
    position: i64,
    texcoord: Option<i64>,
    normal: Option<i64>,
}

fn vec3(input: &str) -> IResult<&str, Vec3f> {
    map(
        tuple((
            float,
            preceded(space1, float),
            preceded(space1, float),
            opt(preceded(space1, float)),
        )),
        |(x, y, z, _w)| Vec3f::new(x, y, z),
    )(input)
}

fn texcoord(input: &str) -> IResult<&str, Vec2f> {
    map(
        tuple((float, opt(preceded(space1, float)), opt(preceded(space1, float)))),
        |(u, v, _w)| Vec2f::new(u, v.unwrap_or(0.0)),
    )(input)
}

// v, v/vt, v/vt/vn, v//vn
fn corner(input: &str) -> IResult<&str, Corner> {
    map(
        tuple((index, opt(preceded(tag("/"), opt(index))), opt(preceded(tag("/"), index)))),
        |(position, texcoord, normal)| Corner {
            position,
            texcoord: texcoord.flatten(),
            normal,
        },
    )(input)
}

fn face(input: &str) -> IResult<&str, Vec<Corner>> {
    separated_list1(space1, corner)(input)
}

/// Split a line into keyword and trimmed arguments, dropping comments.
fn statement(raw: &str) -> Option<(&str, &str)> {
    let line = raw.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return None;
    }
    Some(match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    })
}

fn parse_args<'a, T>(
    line: usize,
    keyword: &str,
    args: &'a str,
    parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
) -> CoreResult<T> {
    all_consuming(parser)(args)
        .map(|(_, value)| value)
        .map_err(|_| CoreError::ObjParse {
            line,
            message: format!("malformed `{keyword}` statement: {args:?}"),
        })
}

/// Resolve an OBJ index against `len` loaded elements.
fn resolve(line: usize, what: &str, i: i64, len: usize) -> CoreResult<usize> {
    let resolved = match i {
        i if i > 0 => Some(i as usize - 1),
        i if i < 0 => len.checked_sub(i.unsigned_abs() as usize),
        _ => None,
    };
    resolved.filter(|&r| r < len).ok_or_else(|| CoreError::ObjParse {
        line,
        message: format!("{what} index {i} out of range ({len} defined)"),
    })
}

/// Parse an MTL material library, keeping each material's ambient color.
pub fn parse_mtl(source: &str) -> CoreResult<MaterialLibrary> {
    let mut library = MaterialLibrary::default();
    let mut current: Option<String> = None;

    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let Some((keyword, args)) = statement(raw) else {
            continue;
        };
        match keyword {
            "newmtl" => {
                if args.is_empty() {
                    return Err(CoreError::ObjParse {
                        line,
                        message: "`newmtl` without a name".into(),
                    });
                }
                library.insert(args, DEFAULT_COLOR);
                current = Some(args.to_string());
            }
            "Ka" => {
                let color = parse_args(line, keyword, args, vec3)?;
                let name = current.as_deref().ok_or_else(|| CoreError::ObjParse {
                    line,
                    message: "`Ka` before any `newmtl`".into(),
                })?;
                library.insert(name, color);
            }
            _ => {}
        }
    }

    Ok(library)
}

/// Names of the material libraries an OBJ source refers to.
pub fn material_libraries(source: &str) -> Vec<&str> {
    source
        .lines()
        .filter_map(statement)
        .filter(|(keyword, _)| *keyword == "mtllib")
        .flat_map(|(_, args)| args.split_whitespace())
        .collect()
}

/// Parse OBJ text into a triangle list.
///
/// Polygons are fan-triangulated. Corners without a normal index take the
/// flat normal of their triangle. Texcoords are kept only when every corner
/// has one. Colors come from the ambient term of the active material; with
/// an empty `materials` library every vertex is [`DEFAULT_COLOR`].
pub fn parse_obj(source: &str, materials: &MaterialLibrary) -> CoreResult<MeshBuffer> {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut texcoords = Vec::new();

    let mut mesh = MeshBuffer::new();
    let mut corner_uvs: Vec<Option<Vec2f>> = Vec::new();
    let mut color = DEFAULT_COLOR;
    let mut flat_fallback = false;
    let mut degenerate = 0usize;

    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let Some((keyword, args)) = statement(raw) else {
            continue;
        };
        match keyword {
            "v" => positions.push(parse_args(line, keyword, args, vec3)?),
            "vn" => normals.push(parse_args(line, keyword, args, vec3)?),
            "vt" => texcoords.push(parse_args(line, keyword, args, texcoord)?),
            "usemtl" => {
                color = match materials.get(args) {
                    Some(ambient) => ambient,
                    None if materials.is_empty() => DEFAULT_COLOR,
                    None => return Err(CoreError::MissingMaterial(args.to_string())),
                };
            }
            "f" => {
                let corners = parse_args(line, keyword, args, face)?;
                if corners.len() < 3 {
                    return Err(CoreError::ObjParse {
                        line,
                        message: format!("face with {} corners", corners.len()),
                    });
                }
                for k in 1..corners.len() - 1 {
                    let tri = [corners[0], corners[k], corners[k + 1]];

                    let mut p = [Vec3f::ZERO; 3];
                    for (slot, c) in p.iter_mut().zip(&tri) {
                        *slot = positions[resolve(line, "position", c.position, positions.len())?];
                    }

                    let mut uv = [None; 3];
                    for (slot, c) in uv.iter_mut().zip(&tri) {
                        if let Some(t) = c.texcoord {
                            *slot = Some(texcoords[resolve(line, "texcoord", t, texcoords.len())?]);
                        }
                    }

                    let mut n = [Vec3f::ZERO; 3];
                    if tri.iter().all(|c| c.normal.is_some()) {
                        for (slot, c) in n.iter_mut().zip(&tri) {
                            let idx = c.normal.unwrap_or_default();
                            *slot = normals[resolve(line, "normal", idx, normals.len())?];
                        }
                    } else {
                        match try_flat_normal(p[0], p[1], p[2]) {
                            Some(flat) => {
                                flat_fallback = true;
                                n = [flat; 3];
                            }
                            None => {
                                degenerate += 1;
                                continue;
                            }
                        }
                    }

                    for j in 0..3 {
                        corner_uvs.push(uv[j]);
                        mesh.positions.push(p[j]);
                        mesh.normals.push(n[j]);
                        mesh.colors.push(color);
                    }
                }
            }
            "mtllib" | "o" | "g" | "s" | "l" => {}
            other => debug!(line, keyword = other, "skipping unsupported OBJ statement"),
        }
    }

    if flat_fallback {
        warn!("OBJ faces without normals were given flat normals");
    }
    if degenerate > 0 {
        warn!(degenerate, "dropped zero-area OBJ triangles without normals");
    }

    let textured = corner_uvs.iter().filter(|uv| uv.is_some()).count();
    if textured == corner_uvs.len() {
        mesh.texcoords = corner_uvs.into_iter().flatten().collect();
    } else if textured > 0 {
        warn!(textured, total = corner_uvs.len(), "dropping partial OBJ texcoords");
    }

    debug!(vertices = mesh.vertex_count(), "parsed OBJ mesh");
    Ok(mesh)
}

/// Load an OBJ file and the material libraries it names (resolved relative
/// to the OBJ file). A library that cannot be read is skipped with a warning.
pub fn load_obj(path: impl AsRef<Path>) -> CoreResult<MeshBuffer> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut materials = MaterialLibrary::default();
    for name in material_libraries(&source) {
        let lib_path = dir.join(name);
        match std::fs::read_to_string(&lib_path) {
            Ok(text) => materials.extend(parse_mtl(&text)?),
            Err(e) => warn!(path = %lib_path.display(), error = %e, "material library unavailable"),
        }
    }

    let mesh = parse_obj(&source, &materials)?;
    debug!(path = %path.display(), vertices = mesh.vertex_count(), "loaded OBJ");
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
mtllib pad.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl Concrete
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_parse_mtl_ambient() {
        let lib = parse_mtl("newmtl Concrete\nKd 1 1 1\nKa 0.5 0.25 0.125\n\nnewmtl Bare\n").unwrap();
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get("Concrete"), Some(Vec3f::new(0.5, 0.25, 0.125)));
        assert_eq!(lib.get("Bare"), Some(DEFAULT_COLOR));
    }

    #[test]
    fn test_ka_before_newmtl_is_an_error() {
        assert!(parse_mtl("Ka 1 1 1\n").is_err());
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let mut lib = MaterialLibrary::default();
        lib.insert("Concrete", Vec3f::new(0.2, 0.2, 0.2));
        let mesh = parse_obj(QUAD, &lib).unwrap();

        assert_eq!(mesh.vertex_count(), 6);
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.positions[3], Vec3f::new(0.0, 0.0, 0.0));
        assert_eq!(mesh.positions[5], Vec3f::new(0.0, 1.0, 0.0));
        assert_eq!(mesh.texcoords[4], Vec2f::new(1.0, 1.0));
        assert!(mesh.colors.iter().all(|c| *c == Vec3f::new(0.2, 0.2, 0.2)));
        assert!(mesh.normals.iter().all(|n| *n == Vec3f::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_material_libraries_listed() {
        assert_eq!(material_libraries(QUAD), vec!["pad.mtl"]);
    }

    #[test]
    fn test_unknown_material_with_library_is_an_error() {
        let mut lib = MaterialLibrary::default();
        lib.insert("Steel", DEFAULT_COLOR);
        assert!(matches!(parse_obj(QUAD, &lib), Err(CoreError::MissingMaterial(name)) if name == "Concrete"));
    }

    #[test]
    fn test_no_library_means_default_color() {
        let mesh = parse_obj(QUAD, &MaterialLibrary::default()).unwrap();
        assert!(mesh.colors.iter().all(|c| *c == DEFAULT_COLOR));
    }

    #[test]
    fn test_missing_normals_use_flat_normal() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse_obj(src, &MaterialLibrary::default()).unwrap();
        assert_eq!(mesh.normals, vec![Vec3f::new(0.0, 0.0, 1.0); 3]);
        assert!(!mesh.has_texcoords());
    }

    #[test]
    fn test_degenerate_face_without_normals_is_dropped() {
        let src = "v 0 0 0\nv 1 0 0\nv 2 0 0\nf 1 2 3\n";
        let mesh = parse_obj(src, &MaterialLibrary::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_degenerate_fan_triangle_keeps_the_rest() {
        // Corner 2 repeats corner 1, so only the second fan triangle has area.
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nf 1/1 1/1 2/2 3/3\n";
        let mesh = parse_obj(src, &MaterialLibrary::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.normals, vec![Vec3f::new(0.0, 0.0, 1.0); 3]);
        assert_eq!(mesh.texcoords.len(), 3);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_negative_indices_are_relative() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 -1\nf -3//-1 -2//-1 -1//-1\n";
        let mesh = parse_obj(src, &MaterialLibrary::default()).unwrap();
        assert_eq!(mesh.positions[0], Vec3f::new(0.0, 0.0, 0.0));
        assert_eq!(mesh.normals[2], Vec3f::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_out_of_range_index_reports_line() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        match parse_obj(src, &MaterialLibrary::default()) {
            Err(CoreError::ObjParse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected ObjParse, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_vertex_is_rejected() {
        let src = "v 0 zero 0\n";
        assert!(matches!(
            parse_obj(src, &MaterialLibrary::default()),
            Err(CoreError::ObjParse { line: 1, .. })
        ));
    }
}
