//! Line-oriented OBJ tokenizer.
//!
//! Produces a [`RawMesh`]: attribute tables in file order plus the
//! object/geometry structure of the document. Face corners are resolved to
//! zero-based indices here, but positive indices are only bounds-checked by
//! the indexer, once the full tables are known.

use crate::error::{Attribute, LoadError, LoadResult};

/// One distinct vertex as referenced by a face corner.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct VertexKey {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawFace {
    /// 1-based source line of the `f` record.
    pub line: usize,
    pub corners: Vec<VertexKey>,
}

/// A run of faces opened by `g` or `usemtl`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawGeometry {
    pub groups: Vec<String>,
    pub material: Option<String>,
    pub faces: Vec<RawFace>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawObject {
    /// `None` for the implicit object holding faces that precede any `o`.
    pub name: Option<String>,
    pub geometry: Vec<RawGeometry>,
}

impl RawObject {
    fn new(name: Option<String>) -> Self {
        Self {
            name,
            geometry: Vec::new(),
        }
    }

    pub fn face_count(&self) -> usize {
        self.geometry.iter().map(|g| g.faces.len()).sum()
    }

    /// Geometry blocks that actually hold faces.
    pub fn populated_geometry(&self) -> impl Iterator<Item = &RawGeometry> {
        self.geometry.iter().filter(|g| !g.faces.is_empty())
    }

    fn current_geometry(&mut self) -> &mut RawGeometry {
        if self.geometry.is_empty() {
            self.geometry.push(RawGeometry::default());
        }
        let last = self.geometry.len() - 1;
        &mut self.geometry[last]
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub objects: Vec<RawObject>,
}

impl RawMesh {
    /// Objects that count toward the document's cardinality: every named
    /// object, plus the implicit one if it received faces.
    pub fn declared_objects(&self) -> impl Iterator<Item = &RawObject> {
        self.objects
            .iter()
            .filter(|o| o.name.is_some() || o.face_count() > 0)
    }

    fn current_object(&mut self) -> &mut RawObject {
        if self.objects.is_empty() {
            self.objects.push(RawObject::new(None));
        }
        let last = self.objects.len() - 1;
        &mut self.objects[last]
    }
}

/// Tokenize a whole document.
pub fn parse_raw(text: &str) -> LoadResult<RawMesh> {
    let mut raw = RawMesh::default();
    let mut pending = String::new();
    let mut pending_line = 0;

    for (line_no, line) in text.lines().enumerate() {
        let content = match line.find('#') {
            Some(at) => &line[..at],
            None => line,
        };
        let content = content.trim();

        if content.is_empty() && !pending.is_empty() {
            continue;
        }
        if pending.is_empty() {
            pending_line = line_no + 1;
        }
        if let Some(head) = content.strip_suffix('\\') {
            pending.push_str(head);
            pending.push(' ');
            continue;
        }
        pending.push_str(content);

        let record = std::mem::take(&mut pending);
        if !record.trim().is_empty() {
            parse_record(&mut raw, record.trim(), pending_line)?;
        }
    }

    if !pending.trim().is_empty() {
        parse_record(&mut raw, pending.trim(), pending_line)?;
    }

    log::debug!(
        "Tokenized OBJ: {} positions, {} normals, {} texcoords, {} objects",
        raw.positions.len(),
        raw.normals.len(),
        raw.texcoords.len(),
        raw.objects.len()
    );

    Ok(raw)
}

fn parse_record(raw: &mut RawMesh, record: &str, line: usize) -> LoadResult<()> {
    let mut parts = record.split_whitespace();
    let Some(tag) = parts.next() else {
        return Ok(());
    };

    match tag {
        "v" => {
            let x = parse_f32(parts.next(), line, "x coordinate")?;
            let y = parse_f32(parts.next(), line, "y coordinate")?;
            let z = parse_f32(parts.next(), line, "z coordinate")?;
            // Optional w or per-vertex color follows; neither is kept.
            parse_trailing(parts, line, "v", &[0, 1, 3])?;
            raw.positions.push([x, y, z]);
        }
        "vt" => {
            let u = parse_f32(parts.next(), line, "u coordinate")?;
            let v = match parts.next() {
                Some(token) => parse_f32(Some(token), line, "v coordinate")?,
                None => 0.0,
            };
            parse_trailing(parts, line, "vt", &[0, 1])?;
            raw.texcoords.push([u, v]);
        }
        "vn" => {
            let nx = parse_f32(parts.next(), line, "nx coordinate")?;
            let ny = parse_f32(parts.next(), line, "ny coordinate")?;
            let nz = parse_f32(parts.next(), line, "nz coordinate")?;
            parse_trailing(parts, line, "vn", &[0])?;
            raw.normals.push([nx, ny, nz]);
        }
        "f" => {
            let counts = (raw.positions.len(), raw.texcoords.len(), raw.normals.len());
            let corners = parts
                .map(|token| parse_corner(token, counts, line))
                .collect::<LoadResult<Vec<_>>>()?;
            raw.current_object()
                .current_geometry()
                .faces
                .push(RawFace { line, corners });
        }
        "o" => {
            let name = parts.collect::<Vec<_>>().join(" ");
            raw.objects.push(RawObject::new(Some(name)));
        }
        "g" => {
            let groups: Vec<String> = parts.map(str::to_owned).collect();
            let object = raw.current_object();
            let current = object.current_geometry();
            if current.faces.is_empty() {
                current.groups = groups;
            } else {
                let material = current.material.clone();
                object.geometry.push(RawGeometry {
                    groups,
                    material,
                    faces: Vec::new(),
                });
            }
        }
        "usemtl" => {
            let material = Some(parts.collect::<Vec<_>>().join(" "));
            let object = raw.current_object();
            let current = object.current_geometry();
            if current.faces.is_empty() {
                current.material = material;
            } else {
                let groups = current.groups.clone();
                object.geometry.push(RawGeometry {
                    groups,
                    material,
                    faces: Vec::new(),
                });
            }
        }
        other => {
            log::trace!("Skipping OBJ record '{}' on line {}", other, line);
        }
    }

    Ok(())
}

fn parse_f32(value: Option<&str>, line: usize, what: &str) -> LoadResult<f32> {
    let token = value.ok_or_else(|| LoadError::parse(line, format!("missing {what}")))?;
    let parsed = token
        .parse::<f32>()
        .map_err(|e| LoadError::parse(line, format!("invalid {what} '{token}': {e}")))?;
    if !parsed.is_finite() {
        return Err(LoadError::parse(line, format!("non-finite {what} '{token}'")));
    }
    Ok(parsed)
}

/// Optional numeric components after the required ones. Each must parse and
/// their count must be one of `allowed`.
fn parse_trailing<'a>(
    parts: impl Iterator<Item = &'a str>,
    line: usize,
    record: &str,
    allowed: &[usize],
) -> LoadResult<()> {
    let mut count = 0;
    for token in parts {
        parse_f32(Some(token), line, "optional component")?;
        count += 1;
    }
    if !allowed.contains(&count) {
        return Err(LoadError::parse(
            line,
            format!("unexpected {count} extra component(s) in '{record}' record"),
        ));
    }
    Ok(())
}

fn parse_corner(
    token: &str,
    (pos_count, tex_count, norm_count): (usize, usize, usize),
    line: usize,
) -> LoadResult<VertexKey> {
    let fields: Vec<&str> = token.split('/').collect();
    if fields.len() > 3 {
        return Err(LoadError::parse(
            line,
            format!("malformed face element '{token}'"),
        ));
    }

    let position = match fields[0] {
        "" => {
            return Err(LoadError::parse(
                line,
                format!("face element '{token}' has no position index"),
            ));
        }
        value => resolve_index(value, pos_count, Attribute::Position, line)?,
    };

    let optional = |field: Option<&&str>, len: usize, attribute: Attribute| match field {
        Some(value) if !value.is_empty() => resolve_index(value, len, attribute, line).map(Some),
        _ => Ok(None),
    };

    Ok(VertexKey {
        position,
        texcoord: optional(fields.get(1), tex_count, Attribute::Texcoord)?,
        normal: optional(fields.get(2), norm_count, Attribute::Normal)?,
    })
}

/// Turn a 1-based or negative (relative) reference into a zero-based index.
/// Negative references resolve against the `len` attributes declared so far.
fn resolve_index(token: &str, len: usize, attribute: Attribute, line: usize) -> LoadResult<usize> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| LoadError::parse(line, format!("invalid {attribute} index '{token}'")))?;

    match raw {
        0 => Err(LoadError::parse(
            line,
            format!("OBJ indices are 1-based; found 0 for {attribute}"),
        )),
        r if r > 0 => usize::try_from(r - 1).map_err(|_| LoadError::IndexOutOfRange {
            line,
            attribute,
            index: raw,
            len,
        }),
        r => {
            let back = usize::try_from(r.unsigned_abs()).unwrap_or(usize::MAX);
            len.checked_sub(back).ok_or(LoadError::IndexOutOfRange {
                line,
                attribute,
                index: raw,
                len,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(position: usize, texcoord: Option<usize>, normal: Option<usize>) -> VertexKey {
        VertexKey {
            position,
            texcoord,
            normal,
        }
    }

    #[test]
    fn collects_attribute_tables_in_file_order() {
        let raw = parse_raw(
            "v 1 2 3\nv 4 5 6 1.0\nvn 0 1 0\nvt 0.5\nvt 0.25 0.75 0\n",
        )
        .expect("tokenize");
        assert_eq!(raw.positions, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(raw.normals, vec![[0.0, 1.0, 0.0]]);
        assert_eq!(raw.texcoords, vec![[0.5, 0.0], [0.25, 0.75]]);
        assert!(raw.objects.is_empty());
    }

    #[test]
    fn parses_every_corner_form() {
        let raw = parse_raw("v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1 1/1 1//1 1/1/1\n").expect("tokenize");
        let face = &raw.objects[0].geometry[0].faces[0];
        assert_eq!(face.line, 4);
        assert_eq!(
            face.corners,
            vec![
                key(0, None, None),
                key(0, Some(0), None),
                key(0, None, Some(0)),
                key(0, Some(0), Some(0)),
            ]
        );
    }

    #[test]
    fn trailing_slashes_leave_normal_absent() {
        let raw = parse_raw("v 0 0 0\nf 1// 1// 1//\n").expect("tokenize");
        let face = &raw.objects[0].geometry[0].faces[0];
        assert!(face.corners.iter().all(|c| c.normal.is_none()));
    }

    #[test]
    fn negative_indices_are_relative() {
        let raw = parse_raw("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf -3//-1 -2//-1 -1//-1\n")
            .expect("tokenize");
        let corners = &raw.objects[0].geometry[0].faces[0].corners;
        assert_eq!(corners[0], key(0, None, Some(0)));
        assert_eq!(corners[2], key(2, None, Some(0)));
    }

    #[test]
    fn negative_index_before_first_attribute_is_out_of_range() {
        let err = parse_raw("v 0 0 0\nf -2 1 1\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::IndexOutOfRange {
                line: 2,
                attribute: Attribute::Position,
                index: -2,
                len: 1
            }
        ));
    }

    #[test]
    fn zero_index_is_a_parse_error() {
        let err = parse_raw("v 0 0 0\nf 0 1 1\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
    }

    #[test]
    fn malformed_records_are_parse_errors() {
        let cases = [
            "v 0 0\n",
            "vn 1 x 0\n",
            "v 0 0 inf\n",
            "v 0 0 0\nf 1/1/1/1 1 1\n",
            "f /1 1 1\n",
            "v 0 0 0 junk\n",
            "v 0 0 0 1 1\n",
            "vn 0 0 1 zzz\n",
            "vn 0 0 1 0\n",
            "vt 0 0 nope\n",
            "vt 0 0 0 0\n",
        ];
        for src in cases {
            let err = parse_raw(src).unwrap_err();
            assert!(matches!(err, LoadError::Parse { .. }), "{src:?} gave {err:?}");
        }
    }

    #[test]
    fn optional_components_are_accepted() {
        let raw = parse_raw("v 0 0 0 1\nv 1 0 0 0.5 0.5 0.5\nvt 0.5 0.5 0\nvn 0 0 1\n")
            .expect("tokenize");
        assert_eq!(raw.positions.len(), 2);
        assert_eq!(raw.texcoords, vec![[0.5, 0.5]]);
    }

    #[test]
    fn comment_inside_continuation_is_skipped() {
        let raw = parse_raw("v 0 0 \
# note
  1
v 2 2 2
").expect("tokenize");
        assert_eq!(raw.positions, vec![[0.0, 0.0, 1.0], [2.0, 2.0, 2.0]]);
    }

    #[test]
    fn objects_start_without_geometry() {
        let raw = parse_raw("o empty
").expect("tokenize");
        assert!(raw.objects[0].geometry.is_empty());
        assert_eq!(raw.objects[0].populated_geometry().count(), 0);
    }

    #[test]
    fn comments_and_continuations() {
        let raw = parse_raw("# header\nv 0 0 0 # origin\nv 1 \\\n  0 0\n\n").expect("tokenize");
        assert_eq!(raw.positions, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
    }

    #[test]
    fn objects_and_groups_split_geometry() {
        let src = "\
o first
v 0 0 0
g a
f 1 1 1
g b
f 1 1 1
o second
usemtl red
f 1 1 1
usemtl blue
f 1 1 1
";
        let raw = parse_raw(src).expect("tokenize");
        assert_eq!(raw.declared_objects().count(), 2);

        let first = &raw.objects[0];
        assert_eq!(first.name.as_deref(), Some("first"));
        let groups: Vec<_> = first.populated_geometry().map(|g| g.groups.clone()).collect();
        assert_eq!(groups, vec![vec!["a".to_owned()], vec!["b".to_owned()]]);

        let second = &raw.objects[1];
        let materials: Vec<_> = second
            .populated_geometry()
            .map(|g| g.material.clone())
            .collect();
        assert_eq!(materials, vec![Some("red".to_owned()), Some("blue".to_owned())]);
    }

    #[test]
    fn empty_implicit_object_is_not_declared() {
        let raw = parse_raw("g default\no cube\nv 0 0 0\nf 1 1 1\n").expect("tokenize");
        assert_eq!(raw.objects.len(), 2);
        assert_eq!(raw.declared_objects().count(), 1);
    }
}
