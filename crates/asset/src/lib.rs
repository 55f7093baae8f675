//! Asset loading: Wavefront OBJ meshes turned into GPU-ready indexed buffers.
//!
//! The pipeline is split in two so parsing stays free of I/O:
//! [`read_source`] pulls the text in, [`parse_and_index`] tokenizes it into a
//! [`raw::RawMesh`] and deduplicates face corners into a [`Mesh`].

pub mod error;
pub mod index;
pub mod mesh;
pub mod obj;
pub mod options;
pub mod raw;

pub use error::{Attribute, LoadError, LoadResult};
pub use mesh::{Mesh, Vertex};
pub use obj::{
    load_obj_from_path, load_obj_from_reader, load_obj_from_str, parse_and_index, read_source,
};
pub use options::{LoadOptions, NormalPolicy};
