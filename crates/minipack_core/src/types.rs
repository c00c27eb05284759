use std::{fmt, path::PathBuf};

/// Identifier of a module inside one build. Assigned in first-visit order from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(pub usize);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Specifier to module id lookup, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<(String, ModuleId)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites. An existing key keeps its original position.
    pub fn insert(&mut self, specifier: impl Into<String>, id: ModuleId) {
        let specifier = specifier.into();
        match self.entries.iter_mut().find(|(s, _)| *s == specifier) {
            Some(entry) => entry.1 = id,
            None => self.entries.push((specifier, id)),
        }
    }

    pub fn get(&self, specifier: &str) -> Option<ModuleId> {
        self.entries.iter().find(|(s, _)| s == specifier).map(|(_, id)| *id)
    }

    pub fn contains(&self, specifier: &str) -> bool {
        self.get(specifier).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ModuleId)> {
        self.entries.iter().map(|(s, id)| (s.as_str(), *id))
    }
}

/// One source file after parsing and transformation.
#[derive(Debug, Clone)]
pub struct Asset {
    pub id: ModuleId,
    pub filename: PathBuf,
    /// Raw specifiers in source order, exactly as written.
    pub dependencies: Vec<String>,
    /// Filled in by the graph builder.
    pub mapping: Mapping,
    /// CommonJS code ready to be wrapped in a factory.
    pub code: String,
}

/// Every asset reachable from the entry, breadth-first. `assets()[i].id == i`.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    assets: Vec<Asset>,
}

impl Graph {
    pub(crate) fn from_assets(assets: Vec<Asset>) -> Self {
        debug_assert!(assets.iter().enumerate().all(|(i, a)| a.id.index() == i));
        Self { assets }
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn entry(&self) -> Option<&Asset> {
        self.assets.first()
    }

    pub fn get(&self, id: ModuleId) -> Option<&Asset> {
        self.assets.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_preserves_insertion_order() {
        let mut mapping = Mapping::new();
        mapping.insert("./b.js", ModuleId(2));
        mapping.insert("./a.js", ModuleId(1));
        let keys: Vec<&str> = mapping.iter().map(|(s, _)| s).collect();
        assert_eq!(keys, vec!["./b.js", "./a.js"]);
    }

    #[test]
    fn test_mapping_overwrite_keeps_position() {
        let mut mapping = Mapping::new();
        mapping.insert("./a.js", ModuleId(1));
        mapping.insert("./b.js", ModuleId(2));
        mapping.insert("./a.js", ModuleId(3));
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("./a.js"), Some(ModuleId(3)));
        assert_eq!(mapping.iter().next(), Some(("./a.js", ModuleId(3))));
        assert!(!mapping.contains("./c.js"));
    }

    #[test]
    fn test_module_id_display() {
        assert_eq!(ModuleId(42).to_string(), "42");
    }
}
