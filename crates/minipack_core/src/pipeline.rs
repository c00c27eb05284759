use log::info;
use std::path::Path;

use crate::{
    bundler::{bundle, verify_bundle},
    config::BundleOptions,
    error::BuildResult,
    graph::create_graph,
    output::write_bundle,
    types::Graph,
};

#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub graph: Graph,
    pub code: String,
}

/// Builds the graph for `entry` and emits the bundle text. Nothing is written.
pub fn build(entry: &Path, options: &BundleOptions) -> BuildResult<BuildOutput> {
    let graph = create_graph(entry, options)?;
    let code = bundle(&graph, options);
    if options.verify {
        verify_bundle(&code)?;
    }
    Ok(BuildOutput { graph, code })
}

/// [`build`], then writes the bundle to `output`. A failed build leaves `output` untouched.
pub fn build_to_file(
    entry: &Path,
    output: &Path,
    options: &BundleOptions,
) -> BuildResult<BuildOutput> {
    let result = build(entry, options)?;
    write_bundle(output, &result.code)?;
    info!("Wrote bundle to {}", output.display());
    Ok(result)
}
