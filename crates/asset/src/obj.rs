//! Entry points: read an OBJ source, then tokenize and index it.

use std::{fs, io::Read, path::Path};

use crate::{
    error::{LoadError, LoadResult},
    index::index_mesh,
    mesh::Mesh,
    options::LoadOptions,
    raw::parse_raw,
};

/// Read a whole OBJ file into memory.
pub fn read_source(path: impl AsRef<Path>) -> LoadResult<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| LoadError::io(path, e))
}

/// Tokenize and index already-read OBJ text. Pure; no I/O.
pub fn parse_and_index(text: &str, options: &LoadOptions) -> LoadResult<Mesh> {
    let raw = parse_raw(text)?;
    index_mesh(&raw, options)
}

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> LoadResult<Mesh> {
    let path = path.as_ref();
    log::info!("Loading mesh from {:?}", path);

    let text = read_source(path)?;
    let mesh = parse_and_index(&text, options)?;

    log::info!(
        "Loaded mesh {:?}: {} vertices, {} triangles",
        path,
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Load an OBJ mesh from any [`Read`] implementation.
pub fn load_obj_from_reader<R: Read>(mut reader: R, options: &LoadOptions) -> LoadResult<Mesh> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| LoadError::Io {
            origin: "<reader>".to_owned(),
            source,
        })?;
    parse_and_index(&text, options)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str, options: &LoadOptions) -> LoadResult<Mesh> {
    parse_and_index(contents, options)
}
