use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_span::SourceType;
use std::{fs, path::Path};

use crate::{
    config::BundleOptions,
    error::{BuildError, BuildResult},
    helpers::{helper_name, helper_source},
    ids::IdAllocator,
    parser::{self, needs_lowering, source_type_for},
    transform,
    types::{Asset, Mapping},
};

/// Reads, parses and transforms one file. The returned asset has an empty mapping.
pub fn create_asset(
    filename: &Path,
    ids: &mut IdAllocator,
    options: &BundleOptions,
) -> BuildResult<Asset> {
    trace!("Creating asset for {}", filename.display());
    let source = fs::read_to_string(filename)
        .map_err(|source| BuildError::Read { path: filename.to_path_buf(), source })?;

    let source_type = source_type_for(filename);
    let lowered = if needs_lowering(source_type) || options.lowers_syntax() {
        Some(transform::lower(filename, &source, source_type, &options.target)?)
    } else {
        None
    };

    let allocator = Allocator::default();
    let program = match &lowered {
        Some(code) => parser::parse(
            &allocator,
            filename,
            code,
            SourceType::default().with_module(source_type.is_module()),
        )
        .map_err(|e| match e {
            BuildError::Parse { path, message } => BuildError::Transform {
                path,
                message: format!("transformer produced invalid code: {message}"),
            },
            other => other,
        })?,
        None => parser::parse(&allocator, filename, &source, source_type)?,
    };
    let text = lowered.as_deref().unwrap_or(&source);

    let dependencies = parser::dependencies(&program);
    if let Some(name) = dependencies
        .iter()
        .filter_map(|d| helper_name(d))
        .find(|name| helper_source(name).is_none())
    {
        return Err(BuildError::Transform {
            path: filename.to_path_buf(),
            message: format!("lowering needs runtime helper `{name}`, which cannot be bundled; raise the target"),
        });
    }
    let code = transform::to_commonjs(&program, text);

    let id = ids.allocate();
    debug!("Asset {} <- {} ({} dependencies)", id, filename.display(), dependencies.len());

    Ok(Asset { id, filename: filename.to_path_buf(), dependencies, mapping: Mapping::new(), code })
}

/// Builds the embedded helper module behind `specifier`, named after the specifier.
pub(crate) fn create_helper_asset(
    specifier: &str,
    ids: &mut IdAllocator,
) -> BuildResult<Asset> {
    let filename = Path::new(specifier);
    let source = helper_name(specifier).and_then(helper_source).ok_or_else(|| {
        BuildError::Transform {
            path: filename.to_path_buf(),
            message: format!("no bundled runtime helper for '{specifier}'"),
        }
    })?;

    let allocator = Allocator::default();
    let program =
        parser::parse(&allocator, filename, &source, SourceType::default().with_module(false))?;
    let code = transform::to_commonjs(&program, &source);

    let id = ids.allocate();
    debug!("Asset {} <- helper {}", id, specifier);
    Ok(Asset {
        id,
        filename: filename.to_path_buf(),
        dependencies: Vec::new(),
        mapping: Mapping::new(),
        code,
    })
}
