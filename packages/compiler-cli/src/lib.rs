#![deny(clippy::all)]

/**
 * Skein Compiler CLI
 *
 * Package discovery, configuration files and output writing around
 * `skein_compiler`.
 */
pub use skein_compiler as compiler;

pub mod config;
pub mod perform_compile;

/// CLI version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
