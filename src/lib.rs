//! Connect-4 engine with two independent searches: [Monte Carlo Tree Search]
//! in serial, leaf-parallel and root-parallel flavors and [Alpha-Beta] minimax
//! with optional branch parallelism.
//!
//! [`Session`] is the entry point: it owns the position, the configuration
//! and the worker pool, runs one of the engines and commits the chosen
//! columns.
//!
//! [Monte Carlo Tree Search]: https://www.chessprogramming.org/Monte-Carlo_Tree_Search
//! [Alpha-Beta]: https://www.chessprogramming.org/Alpha-Beta

// TODO: Gradually move most of warnings to deny.
#![warn(missing_docs, variant_size_differences)]
// Rustc lints.
#![warn(
    absolute_paths_not_starting_with_crate,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]
// Rustdoc lints.
#![warn(
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]
// Clippy lints.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
// Rollouts dominate the running time.
#![deny(clippy::perf)]

pub mod board;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod mcts;
pub mod search;

mod engine;
mod session;

pub use config::SearchConfig;
pub use engine::Engine;
pub use error::{Error, Result};
pub use session::{EngineKind, SearchReport, Session};

use std::io::Write;

use shadow_rs::shadow;

shadow!(build);

/// CPU features the binary was compiled with. Produced by `build.rs`.
const FEATURES: &str = include_str!(concat!(env!("OUT_DIR"), "/features"));

/// Returns the full engine version that can be used to identify how it was
/// built in the first place.
#[must_use]
pub fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Writes the engine version and the build flavor.
///
/// # Errors
///
/// Propagates I/O errors of the output.
pub fn write_engine_info(output: &mut impl Write) -> std::io::Result<()> {
    writeln!(output, "id name {} {}", env!("CARGO_PKG_NAME"), engine_version())?;
    writeln!(output, "id author {}", env!("CARGO_PKG_AUTHORS"))?;
    writeln!(output, "info string release build: {}", !shadow_rs::is_debug())?;
    writeln!(output, "info string features: {}", FEATURES.trim())?;
    if !shadow_rs::git_clean() {
        writeln!(output, "info string built with uncommitted changes")?;
    }
    Ok(())
}
