//! A minimal JavaScript module bundler.
//!
//! Starting from an entry file, this crate:
//! - builds an [`Asset`] for every file reachable through `import`, `export ... from`
//!   and `require` (parsing, lowering and CommonJS rewriting go through oxc)
//! - links them into a breadth-first [`Graph`] with per-module specifier mappings
//! - emits a single self-executing script with a tiny `require` runtime
//!
//! # Examples
//!
//! ```no_run
//! use minipack_core::{BundleOptions, build_to_file};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), minipack_core::BuildError> {
//! let options = BundleOptions::load(Path::new("./example"))?;
//! let result = build_to_file(Path::new("./example/entry.js"), Path::new("./bundle.js"), &options)?;
//! println!("bundled {} modules", result.graph.len());
//! # Ok(())
//! # }
//! ```

mod asset;
mod bundler;
mod config;
mod error;
mod graph;
mod helpers;
mod ids;
mod literal;
mod output;
mod parser;
mod pipeline;
mod resolver;
mod runtime;
mod transform;
mod types;

// Re-export public API
pub use asset::create_asset;
pub use bundler::{Bundle, Factory, ModuleEntry, ModuleTable, bundle, verify_bundle};
pub use config::{BundleOptions, CONFIG_FILE, ModuleIdentity};
pub use error::{BuildError, BuildResult, ErrorKind};
pub use graph::create_graph;
pub use ids::IdAllocator;
pub use output::write_bundle;
pub use pipeline::{BuildOutput, build, build_to_file};
pub use resolver::{dirname, resolve};
pub use runtime::{FACTORY_PARAMS, Runtime, UNKNOWN_MODULE_ERROR, UNRESOLVED_SPECIFIER_ERROR};
pub use types::{Asset, Graph, Mapping, ModuleId};
