//! Vertex deduplication: [`RawMesh`] to indexed [`Mesh`].

use std::collections::HashMap;

use crate::{
    error::{Attribute, LoadError, LoadResult},
    mesh::{Mesh, Vertex},
    options::{LoadOptions, NormalPolicy},
    raw::{RawGeometry, RawMesh, RawObject, VertexKey},
};

/// Build an indexed mesh from the single geometry block of a tokenized
/// document. Corners sharing a full [`VertexKey`] share one output vertex;
/// the same position under a different normal or texcoord does not.
pub fn index_mesh(raw: &RawMesh, options: &LoadOptions) -> LoadResult<Mesh> {
    let (object, geometry) = single_geometry(raw)?;
    log::debug!(
        "Indexing object '{}': {} faces",
        object.name.as_deref().unwrap_or("<unnamed>"),
        geometry.faces.len()
    );

    let mut vertex_cache: HashMap<VertexKey, u32> = HashMap::new();
    let mut vertices: Vec<Vertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::with_capacity(geometry.faces.len() * 3);

    for face in &geometry.faces {
        let [a, b, c] = face.corners.as_slice() else {
            return Err(LoadError::UnsupportedTopology {
                line: face.line,
                corners: face.corners.len(),
            });
        };

        for key in [a, b, c] {
            if let Some(&vertex_index) = vertex_cache.get(key) {
                indices.push(vertex_index);
                continue;
            }

            let vertex = resolve_vertex(raw, key, face.line, options)?;
            let vertex_index = u32::try_from(vertices.len()).map_err(|_| {
                LoadError::Structure(format!("too many vertices (>{})", u32::MAX))
            })?;
            vertex_cache.insert(*key, vertex_index);
            vertices.push(vertex);
            indices.push(vertex_index);
        }
    }

    Ok(Mesh::new(vertices, indices))
}

/// Exactly one object holding exactly one populated geometry block.
fn single_geometry(raw: &RawMesh) -> LoadResult<(&RawObject, &RawGeometry)> {
    let objects: Vec<&RawObject> = raw.declared_objects().collect();
    let [object] = objects.as_slice() else {
        return Err(LoadError::Structure(format!(
            "expecting a single object, found {}",
            objects.len()
        )));
    };

    let blocks: Vec<&RawGeometry> = object.populated_geometry().collect();
    let [geometry] = blocks.as_slice() else {
        return Err(LoadError::Structure(format!(
            "expecting a single geometry in object '{}', found {}",
            object.name.as_deref().unwrap_or("<unnamed>"),
            blocks.len()
        )));
    };

    Ok((*object, *geometry))
}

fn resolve_vertex(
    raw: &RawMesh,
    key: &VertexKey,
    line: usize,
    options: &LoadOptions,
) -> LoadResult<Vertex> {
    let position = *lookup(&raw.positions, key.position, Attribute::Position, line)?;

    // Texcoords are not part of the vertex layout but must still point somewhere real.
    if let Some(texcoord) = key.texcoord {
        lookup(&raw.texcoords, texcoord, Attribute::Texcoord, line)?;
    }

    let normal = match (key.normal, options.normals) {
        (Some(normal), _) => *lookup(&raw.normals, normal, Attribute::Normal, line)?,
        (None, NormalPolicy::Fallback(normal)) => normal,
        (None, NormalPolicy::Strict) => {
            return Err(LoadError::MissingAttribute {
                line,
                attribute: Attribute::Normal,
            });
        }
    };

    Ok(Vertex::new(position, normal))
}

fn lookup<T>(table: &[T], index: usize, attribute: Attribute, line: usize) -> LoadResult<&T> {
    table.get(index).ok_or_else(|| LoadError::IndexOutOfRange {
        line,
        attribute,
        index: i64::try_from(index).map_or(i64::MAX, |i| i + 1),
        len: table.len(),
    })
}
