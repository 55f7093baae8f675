//! Entry point for objinfo: load a Wavefront OBJ and report what the
//! indexer produced.

use anyhow::{Context, Result, bail};
use asset::{LoadOptions, NormalPolicy, raw::parse_raw};

fn parse_path_arg() -> Result<String> {
    // First non-flag argument.
    match std::env::args().skip(1).find(|arg| !arg.starts_with("--")) {
        Some(path) => Ok(path),
        None => bail!(
            "usage: objinfo <path-to-obj> [--normals=strict|fallback] [--fallback-normal=x,y,z] [--quiet]"
        ),
    }
}

fn parse_fallback_normal(value: &str) -> Result<[f32; 3]> {
    let parts = value
        .split(',')
        .map(|c| c.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid --fallback-normal '{}'", value))?;
    match parts.as_slice() {
        &[x, y, z] => Ok([x, y, z]),
        _ => bail!("--fallback-normal expects three components, got '{}'", value),
    }
}

fn parse_options_args() -> Result<LoadOptions> {
    let args: Vec<String> = std::env::args().collect();
    options_from_args(&args)
}

/// Accept: --normals=strict|fallback, --fallback-normal=x,y,z.
/// A fallback normal implies the fallback policy; asking for strict at the
/// same time is rejected rather than resolved by flag order.
fn options_from_args<S: AsRef<str>>(args: &[S]) -> Result<LoadOptions> {
    let mut policy: Option<bool> = None;
    let mut normal: Option<[f32; 3]> = None;
    for arg in args {
        let arg: &str = arg.as_ref();
        if let Some(val) = arg.strip_prefix("--normals=") {
            policy = Some(match val.to_ascii_lowercase().as_str() {
                "strict" => false,
                "fallback" | "lenient" => true,
                other => bail!("Unknown normal policy '{}' (expected strict or fallback)", other),
            });
        } else if let Some(val) = arg.strip_prefix("--fallback-normal=") {
            normal = Some(parse_fallback_normal(val)?);
        }
    }

    let normals = match (policy, normal) {
        (Some(false), Some(_)) => {
            bail!("--normals=strict conflicts with --fallback-normal")
        }
        (Some(false), None) | (None, None) => NormalPolicy::Strict,
        (_, Some(normal)) => NormalPolicy::Fallback(normal),
        (Some(true), None) => NormalPolicy::FALLBACK_UP_Z,
    };
    Ok(LoadOptions::new().with_normals(normals))
}

fn parse_quiet_arg() -> bool {
    std::env::args().any(|arg| arg == "--quiet")
}

fn main() -> Result<()> {
    let default_filter = if parse_quiet_arg() { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let path = parse_path_arg()?;
    let options = parse_options_args()?;
    log::info!("Inspecting {} (normals: {:?})", path, options.normals);

    let text = asset::read_source(&path)?;
    let raw = parse_raw(&text).with_context(|| format!("Failed to tokenize {}", path))?;
    for object in raw.declared_objects() {
        log::info!(
            "object {}: {} faces in {} geometry block(s)",
            object.name.as_deref().unwrap_or("<unnamed>"),
            object.face_count(),
            object.populated_geometry().count()
        );
    }
    log::info!(
        "{} positions, {} normals, {} texcoords",
        raw.positions.len(),
        raw.normals.len(),
        raw.texcoords.len()
    );

    let mesh = asset::index::index_mesh(&raw, &options)
        .with_context(|| format!("Failed to index {}", path))?;

    if !mesh.is_valid() {
        bail!("{} produced an inconsistent mesh", path);
    }

    let corners = mesh.indices.len();
    log::info!(
        "{} vertices, {} triangles, {} bytes of vertex data, {} bytes of index data",
        mesh.vertices.len(),
        mesh.triangle_count(),
        mesh.vertex_bytes().len(),
        mesh.index_bytes().len()
    );
    if corners > 0 {
        log::info!(
            "Deduplication kept {:.1}% of {} face corners",
            100.0 * mesh.vertices.len() as f64 / corners as f64,
            corners
        );
    }

    println!(
        "{}: {} vertices, {} triangles",
        path,
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    Ok(())
}
