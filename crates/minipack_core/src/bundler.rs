//! Bundle emission.
//!
//! The graph is first lowered into a [`Bundle`]: the [`Runtime`] bootstrap plus a
//! [`ModuleTable`] holding one factory and one mapping per module. Serializing
//! that structure is the only place bundle text is produced.

use log::{debug, info};
use oxc_allocator::Allocator;
use oxc_span::SourceType;
use std::{fmt, path::Path};

use crate::{
    config::BundleOptions,
    error::{BuildError, BuildResult},
    literal::string_literal,
    parser,
    runtime::{FACTORY_PARAMS, Runtime},
    types::{Graph, ModuleId},
};

/// Wrapper function around one module's code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factory {
    pub params: [&'static str; 3],
    /// Module code, embedded verbatim.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    pub id: ModuleId,
    pub factory: Factory,
    pub mapping: Vec<(String, ModuleId)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleTable {
    pub entries: Vec<ModuleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub runtime: Runtime,
    pub table: ModuleTable,
}

impl Bundle {
    pub fn from_graph(graph: &Graph, options: &BundleOptions) -> Self {
        let entries = graph
            .assets()
            .iter()
            .map(|asset| ModuleEntry {
                id: asset.id,
                factory: Factory { params: FACTORY_PARAMS, body: asset.code.clone() },
                mapping: asset.mapping.iter().map(|(s, id)| (s.to_string(), id)).collect(),
            })
            .collect();

        Self {
            runtime: Runtime { cache_exports: options.cache_exports, entry: 0 },
            table: ModuleTable { entries },
        }
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.runtime.write_head(f)?;
        write!(f, "{}", self.table)?;
        self.runtime.write_tail(f)
    }
}

impl fmt::Display for ModuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "{{}}");
        }
        writeln!(f, "{{")?;
        for entry in &self.entries {
            write!(f, "{entry}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for ModuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  {}: [", string_literal(&self.id.to_string()))?;
        writeln!(f, "    {},", self.factory)?;
        write!(f, "    {{")?;
        for (i, (specifier, id)) in self.mapping.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", string_literal(specifier), id)?;
        }
        writeln!(f, "}}")?;
        writeln!(f, "  ],")
    }
}

impl fmt::Display for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The body is never re-indented: that would alter template literals
        writeln!(f, "function ({}) {{", self.params.join(", "))?;
        f.write_str(&self.body)?;
        if !self.body.ends_with('\n') {
            // Keeps a trailing line comment from swallowing the closing brace
            writeln!(f)?;
        }
        write!(f, "    }}")
    }
}

/// Serializes `graph` into a self-executing script.
pub fn bundle(graph: &Graph, options: &BundleOptions) -> String {
    let code = Bundle::from_graph(graph, options).to_string();
    info!("Emitted bundle with {} modules ({} bytes)", graph.len(), code.len());
    code
}

/// Checks that emitted bundle text parses as a script.
pub fn verify_bundle(code: &str) -> BuildResult<()> {
    let allocator = Allocator::default();
    let script = SourceType::default().with_module(false);
    parser::parse(&allocator, Path::new("<bundle>"), code, script).map_err(|e| match e {
        BuildError::Parse { message, .. } => BuildError::InvalidBundle { message },
        other => other,
    })?;
    debug!("Bundle verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, types::Asset, types::Mapping};
    use std::path::PathBuf;

    fn asset(id: usize, code: &str, deps: &[(&str, usize)]) -> Asset {
        let mut mapping = Mapping::new();
        for (specifier, target) in deps {
            mapping.insert(*specifier, ModuleId(*target));
        }
        Asset {
            id: ModuleId(id),
            filename: PathBuf::from(format!("/src/{id}.js")),
            dependencies: deps.iter().map(|(s, _)| s.to_string()).collect(),
            mapping,
            code: code.to_string(),
        }
    }

    fn graph(assets: Vec<Asset>) -> Graph {
        Graph::from_assets(assets)
    }

    #[test]
    fn test_table_layout() {
        let g = graph(vec![
            asset(0, "console.log(require(\"./a.js\"));", &[("./a.js", 1)]),
            asset(1, "module.exports = 1;", &[]),
        ]);
        let code = bundle(&g, &BundleOptions::default());

        assert!(code.starts_with("(function (modules) {\n"));
        assert!(code.ends_with("});\n"));
        assert!(code.contains(
            "  \"0\": [\n    function (require, module, exports) {\nconsole.log(require(\"./a.js\"));\n    },\n    {\"./a.js\": 1}\n  ],\n"
        ));
        assert!(code.contains("  \"1\": [\n    function (require, module, exports) {\nmodule.exports = 1;\n    },\n    {}\n  ],\n"));
        assert_eq!(code.matches("require(0);").count(), 1);
        verify_bundle(&code).unwrap();
    }

    #[test]
    fn test_entries_in_graph_order() {
        let g = graph(vec![asset(0, "", &[("./b", 1), ("./a", 2)]), asset(1, "", &[]), asset(2, "", &[])]);
        let code = bundle(&g, &BundleOptions::default());
        let zero = code.find("\"0\": [").unwrap();
        let one = code.find("\"1\": [").unwrap();
        let two = code.find("\"2\": [").unwrap();
        assert!(zero < one && one < two);
        assert!(code.contains("{\"./b\": 1, \"./a\": 2}"));
    }

    #[test]
    fn test_code_embedded_verbatim() {
        let body = "var s = `line one\n    indented`;\n// trailing comment";
        let g = graph(vec![asset(0, body, &[])]);
        let code = bundle(&g, &BundleOptions::default());
        assert!(code.contains("{\nvar s = `line one\n    indented`;\n// trailing comment\n    },"));
        verify_bundle(&code).unwrap();
    }

    #[test]
    fn test_specifiers_are_escaped() {
        let g = graph(vec![
            asset(0, "require(\"./it's \\\"odd\\\".js\");", &[("./it's \"odd\".js", 1)]),
            asset(1, "", &[]),
        ]);
        let code = bundle(&g, &BundleOptions::default());
        assert!(code.contains(r#"{"./it's \"odd\".js": 1}"#));
        verify_bundle(&code).unwrap();
    }

    #[test]
    fn test_runtime_without_cache() {
        let g = graph(vec![asset(0, "", &[])]);
        let code = bundle(&g, &BundleOptions::default());
        assert!(!code.contains("cache"));
        assert!(code.contains("fn(localRequire, module, module.exports);"));
        assert!(code.contains("UnknownModuleError"));
        assert!(code.contains("UnresolvedSpecifierError"));
    }

    #[test]
    fn test_runtime_with_cache() {
        let g = graph(vec![asset(0, "", &[])]);
        let options = BundleOptions { cache_exports: true, ..Default::default() };
        let code = bundle(&g, &options);
        assert!(code.contains("var cache = {};"));
        assert!(code.contains("return cache[id].exports;"));
        let cached = code.find("cache[id] = module;").unwrap();
        let run = code.find("fn(localRequire").unwrap();
        assert!(cached < run);
        verify_bundle(&code).unwrap();
    }

    #[test]
    fn test_bundle_ir_from_graph() {
        let g = graph(vec![asset(0, "a()", &[("./x.js", 1)]), asset(1, "x()", &[])]);
        let ir = Bundle::from_graph(&g, &BundleOptions::default());
        assert_eq!(ir.table.entries.len(), 2);
        assert_eq!(ir.table.entries[0].factory.params, ["require", "module", "exports"]);
        assert_eq!(ir.table.entries[0].mapping, vec![("./x.js".to_string(), ModuleId(1))]);
        assert_eq!(ir.runtime.entry, 0);
    }

    #[test]
    fn test_verify_rejects_invalid_code() {
        let err = verify_bundle("(function () {").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Emit);
    }
}
