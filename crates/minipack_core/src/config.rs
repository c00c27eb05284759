use log::{debug, trace};
use serde::Deserialize;
use std::{fs, io, path::Path};

use crate::error::{BuildError, BuildResult};

pub const CONFIG_FILE: &str = "minipack.json";

/// How the graph builder decides whether two imports refer to the same module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleIdentity {
    /// Every import occurrence gets its own module, even for the same file.
    #[default]
    PerImport,
    /// Imports resolving to the same file share one module.
    ResolvedPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BundleOptions {
    pub module_identity: ModuleIdentity,
    /// Emit a runtime that executes each module once and reuses its exports.
    pub cache_exports: bool,
    /// Syntax target handed to the transformer, e.g. `es2015` or `esnext`.
    /// `esnext` skips lowering for plain JavaScript.
    pub target: String,
    /// Re-parse the emitted bundle before writing it.
    pub verify: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            module_identity: ModuleIdentity::PerImport,
            cache_exports: false,
            target: "es2015".to_string(),
            verify: true,
        }
    }
}

impl BundleOptions {
    /// Reads `minipack.json` from `dir`, falling back to defaults when there is none.
    pub fn load(dir: &Path) -> BuildResult<Self> {
        let path = dir.join(CONFIG_FILE);
        trace!("Looking for config at: {:?}", path);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No {} in {}, using defaults", CONFIG_FILE, dir.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(BuildError::Read { path, source }),
        };

        let options: Self = serde_json::from_str(&content)
            .map_err(|source| BuildError::Config { path: path.clone(), source })?;
        debug!("Loaded config from {}: {:?}", path.display(), options);
        Ok(options)
    }

    pub(crate) fn lowers_syntax(&self) -> bool {
        !self.target.eq_ignore_ascii_case("esnext")
    }
}
