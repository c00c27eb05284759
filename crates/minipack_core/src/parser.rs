use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;
use std::{fmt::Display, path::Path};

use crate::error::{BuildError, BuildResult};

/// Parses `source` into a program allocated in `allocator`. Any diagnostic is fatal.
pub(crate) fn parse<'a>(
    allocator: &'a Allocator,
    path: &Path,
    source: &'a str,
    source_type: SourceType,
) -> BuildResult<Program<'a>> {
    trace!("Parsing {} as {:?}", path.display(), source_type);
    let ParserReturn { program, errors, panicked, .. } =
        OxcParser::new(allocator, source, source_type).parse();

    if panicked || !errors.is_empty() {
        let message = if errors.is_empty() {
            "parser aborted".to_string()
        } else {
            join_diagnostics(&errors)
        };
        return Err(BuildError::Parse { path: path.to_path_buf(), message });
    }
    Ok(program)
}

pub(crate) fn join_diagnostics<T: Display>(errors: &[T]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
}

/// Collects the module's dependency specifiers in source order, one per occurrence.
pub(crate) fn dependencies(program: &Program<'_>) -> Vec<String> {
    let mut collector = DependencyCollector::default();
    collector.visit_program(program);
    debug!("Found {} dependency specifiers", collector.specifiers.len());
    collector.specifiers
}

#[derive(Default)]
struct DependencyCollector {
    specifiers: Vec<String>,
}

impl DependencyCollector {
    fn push(&mut self, specifier: &str) {
        trace!("Found dependency: '{}'", specifier);
        self.specifiers.push(specifier.to_string());
    }
}

impl<'a> Visit<'a> for DependencyCollector {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        // Type-only imports have no runtime counterpart
        if !decl.import_kind.is_type() {
            self.push(decl.source.value.as_str());
        }
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source
            && !decl.export_kind.is_type()
        {
            self.push(source.value.as_str());
        }
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        if !decl.export_kind.is_type() {
            self.push(decl.source.value.as_str());
        }
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some(specifier) = require_specifier(call) {
            self.push(&specifier);
        }
        walk::walk_call_expression(self, call);
    }
}

/// Returns the specifier of a `require("...")` call with a static argument.
fn require_specifier(call: &CallExpression<'_>) -> Option<String> {
    let Expression::Identifier(callee) = &call.callee else {
        return None;
    };
    if callee.name.as_str() != "require" || call.arguments.len() != 1 {
        return None;
    }
    match call.arguments[0].as_expression()? {
        Expression::StringLiteral(sl) => Some(sl.value.to_string()),
        Expression::TemplateLiteral(tl) if tl.expressions.is_empty() && tl.quasis.len() == 1 => {
            tl.quasis[0].value.cooked.as_ref().map(|c| c.to_string())
        }
        _ => None,
    }
}

pub(crate) fn source_type_for(path: &Path) -> SourceType {
    let ext = path.extension().and_then(|e| e.to_str());

    SourceType::default()
        .with_jsx(matches!(ext, Some("tsx") | Some("jsx")))
        .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")))
        // .cjs/.cts are scripts, everything else is parsed as an ES module
        .with_module(!matches!(ext, Some("cjs") | Some("cts")))
}

pub(crate) fn needs_lowering(source_type: SourceType) -> bool {
    source_type.is_typescript() || source_type.is_jsx()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn deps_of(source: &str) -> Vec<String> {
        let allocator = Allocator::default();
        let program =
            parse(&allocator, Path::new("test.js"), source, SourceType::mjs()).unwrap();
        dependencies(&program)
    }

    #[test]
    fn test_static_import_default() {
        assert_eq!(deps_of("import foo from './foo.js';"), vec!["./foo.js"]);
    }

    #[test]
    fn test_static_import_named_and_namespace() {
        let deps = deps_of("import { bar, baz } from './utils.js';\nimport * as ns from './ns.js';");
        assert_eq!(deps, vec!["./utils.js", "./ns.js"]);
    }

    #[test]
    fn test_side_effect_import() {
        assert_eq!(deps_of("import './polyfills.js';"), vec!["./polyfills.js"]);
    }

    #[test]
    fn test_reexports_are_dependencies() {
        let deps = deps_of(
            "export { a } from './a.js';\nexport * from './b.js';\nexport * as c from './c.js';",
        );
        assert_eq!(deps, vec!["./a.js", "./b.js", "./c.js"]);
    }

    #[test]
    fn test_local_export_is_not_a_dependency() {
        assert!(deps_of("const a = 1; export { a };").is_empty());
    }

    #[test]
    fn test_require_calls_in_source_order() {
        let deps = deps_of(
            "const a = require('./a.js');\nfunction load() { return [require(`./b.js`)]; }\nimport c from './c.js';",
        );
        assert_eq!(deps, vec!["./a.js", "./b.js", "./c.js"]);
    }

    #[test]
    fn test_dynamic_require_and_import_ignored() {
        let deps = deps_of("const name = './x.js'; require(name); import('./lazy.js');");
        assert!(deps.is_empty());
    }

    #[test]
    fn test_repeated_specifier_listed_per_statement() {
        let deps = deps_of("import a from './a.js';\nimport { b } from './a.js';\nexport * from './a.js';");
        assert_eq!(deps, vec!["./a.js", "./a.js", "./a.js"]);
    }

    #[test]
    fn test_no_imports() {
        assert!(deps_of("const x = 42;").is_empty());
    }

    #[test]
    fn test_parse_error_carries_path() {
        let allocator = Allocator::default();
        let err = parse(&allocator, Path::new("broken.js"), "const = ;", SourceType::mjs())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("broken.js"));
    }

    #[test]
    fn test_source_type_for_extensions() {
        assert!(source_type_for(Path::new("a.ts")).is_typescript());
        assert!(source_type_for(Path::new("a.tsx")).is_jsx());
        assert!(source_type_for(Path::new("a.js")).is_module());
        assert!(source_type_for(Path::new("a.cjs")).is_script());
        assert!(!needs_lowering(source_type_for(Path::new("a.mjs"))));
        assert!(needs_lowering(source_type_for(Path::new("a.jsx"))));
    }
}
