//! Loader configuration.

/// What to do with a face corner that carries no normal index.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum NormalPolicy {
    /// Reject the document with [`LoadError::MissingAttribute`](crate::LoadError::MissingAttribute).
    #[default]
    Strict,
    /// Substitute the given normal for every corner lacking one.
    Fallback([f32; 3]),
}

impl NormalPolicy {
    /// Fallback pointing along +Z, the usual choice for flat test meshes.
    pub const FALLBACK_UP_Z: Self = Self::Fallback([0.0, 0.0, 1.0]);
}

/// Options for a single load. Defaults to strict normals.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoadOptions {
    pub normals: NormalPolicy,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normals(mut self, normals: NormalPolicy) -> Self {
        self.normals = normals;
        self
    }
}
