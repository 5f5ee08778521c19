//! # ShapeKit
//!
//! A parametric G-code generator for CNC milling: outlines, pockets,
//! drilling patterns, bezels, stroke-font text engraving, and raw or
//! subroutine G-code inserts, assembled into a complete program.
//!
//! ## Architecture
//!
//! ShapeKit is organized as a workspace with multiple crates:
//!
//! 1. **shapekit-core** - G-code primitive operations, geometry helpers,
//!    error taxonomy
//! 2. **shapekit-shapes** - shape generators, stroke-font and subroutine
//!    loaders, program assembly with change-tracking caches
//! 3. **shapekit** - re-exports plus the command line host

pub use shapekit_core as core;
pub use shapekit_shapes as shapes;

pub use shapekit_core::{ArcDirection, Error, FontError, GCodeOp, Point, Result, SubroutineError};
pub use shapekit_shapes::{
    Defaults, Font, FontHandle, NcShape, Program, ShapeInstance, ShapeKind, ShapeParameters,
    Subroutine, SubroutineHandle,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with console output and RUST_LOG
/// environment variable support.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
    Ok(())
}
