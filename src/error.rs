use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("interaction {source_id} -> {target_id} declared more than once")]
    DuplicateInteraction {
        source_id: String,
        target_id: String,
    },
}

/// Failures while writing a rendered figure. All of them abort the run.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "png")]
    #[error("generated SVG could not be parsed: {0}")]
    Svg(#[from] usvg::Error),

    #[error("cannot allocate a {width}x{height} raster")]
    Raster { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("PNG output requires the `png` feature")]
    PngUnsupported,
}

/// A diagnostic command that could not be run or reported failure.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}
