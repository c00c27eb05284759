use log::{debug, info, trace};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    asset::{create_asset, create_helper_asset},
    config::{BundleOptions, ModuleIdentity},
    error::{BuildError, BuildResult},
    helpers::helper_name,
    ids::IdAllocator,
    resolver::{dirname, identity_key, resolve},
    types::{Asset, Graph, ModuleId},
};

/// Builds the module graph breadth-first from `entry`. The entry asset gets id 0.
pub fn create_graph(entry: &Path, options: &BundleOptions) -> BuildResult<Graph> {
    info!("Building module graph from {}", entry.display());
    let mut ids = IdAllocator::new();
    let entry = path_clean::clean(entry);

    let main = create_asset(&entry, &mut ids, options)?;
    let mut assets: Vec<Asset> = vec![main];
    // Parallel to `assets`: who imported each asset, and its identity key
    let mut parents: Vec<Option<usize>> = vec![None];
    let mut keys: Vec<PathBuf> = vec![identity_key(&entry)];
    let mut seen: HashMap<PathBuf, ModuleId> = HashMap::new();
    seen.insert(keys[0].clone(), ModuleId(0));

    // The queue is `assets` itself; everything past `cursor` is still unprocessed
    let mut cursor = 0;
    while cursor < assets.len() {
        let dir = dirname(&assets[cursor].filename).to_path_buf();
        let dependencies = assets[cursor].dependencies.clone();
        trace!(
            "Processing asset {} ({} dependencies)",
            assets[cursor].id,
            dependencies.len()
        );

        for specifier in dependencies {
            let helper = helper_name(&specifier).is_some();
            let (resolved, key) = if helper {
                (PathBuf::from(&specifier), PathBuf::from(&specifier))
            } else {
                let resolved = resolve(&dir, &specifier);
                let key = identity_key(&resolved);
                (resolved, key)
            };

            let reused = match options.module_identity {
                ModuleIdentity::ResolvedPath => seen.get(&key).copied(),
                ModuleIdentity::PerImport => {
                    if let Some(chain) = import_chain(&parents, &keys, cursor, &key) {
                        return Err(BuildError::Circular { chain });
                    }
                    None
                }
            };

            let child_id = match reused {
                Some(id) => {
                    trace!("Reusing module {} for '{}'", id, specifier);
                    id
                }
                None => {
                    let child = if helper {
                        create_helper_asset(&specifier, &mut ids)?
                    } else {
                        create_asset(&resolved, &mut ids, options)?
                    };
                    let id = child.id;
                    seen.entry(key.clone()).or_insert(id);
                    assets.push(child);
                    parents.push(Some(cursor));
                    keys.push(key);
                    id
                }
            };

            debug!("{} -> '{}' -> {}", assets[cursor].id, specifier, child_id);
            assets[cursor].mapping.insert(specifier, child_id);
        }

        cursor += 1;
    }

    info!("Module graph complete: {} modules", assets.len());
    Ok(Graph::from_assets(assets))
}

/// If `key` is `index` or one of its importers, returns the import chain closing the cycle.
fn import_chain(
    parents: &[Option<usize>],
    keys: &[PathBuf],
    index: usize,
    key: &Path,
) -> Option<Vec<PathBuf>> {
    let mut chain = Vec::new();
    let mut current = Some(index);
    while let Some(i) = current {
        chain.push(keys[i].clone());
        if keys[i] == key {
            chain.reverse();
            chain.push(key.to_path_buf());
            return Some(chain);
        }
        current = parents[i];
    }
    None
}
