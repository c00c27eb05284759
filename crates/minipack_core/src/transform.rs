//! Source transformations applied to every asset.
//!
//! [`lower`] hands TypeScript, JSX and newer syntax to `oxc_transformer`.
//! [`to_commonjs`] rewrites ES module syntax into the `require`/`exports` calls
//! the bundle runtime provides. oxc has no CommonJS module transform, so the
//! rewrite splices the source text at statement spans and leaves all other code
//! untouched except for references to imported bindings, which become member
//! accesses on the required module so they stay live.

use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{Visit, walk};
use oxc_codegen::Codegen;
use oxc_semantic::{Scoping, SemanticBuilder};
use oxc_span::{GetSpan, SourceType, Span};
use oxc_syntax::{identifier::is_identifier_part, symbol::SymbolId};
use oxc_transformer::{TransformOptions, Transformer};
use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use crate::{
    error::{BuildError, BuildResult},
    literal::{member_access, string_literal},
    parser::{join_diagnostics, parse},
};

/// Runs the oxc transformer for `target` and prints the result as plain JavaScript.
pub(crate) fn lower(
    path: &Path,
    source: &str,
    source_type: SourceType,
    target: &str,
) -> BuildResult<String> {
    let options = TransformOptions::from_target(target).map_err(|message| {
        BuildError::Transform { path: path.to_path_buf(), message }
    })?;

    let allocator = Allocator::default();
    let mut program = parse(&allocator, path, source, source_type)?;

    let scoping = SemanticBuilder::new().build(&program).semantic.into_scoping();
    let ret = Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
    if !ret.errors.is_empty() {
        return Err(BuildError::Transform {
            path: path.to_path_buf(),
            message: join_diagnostics(&ret.errors),
        });
    }

    let code = Codegen::new().build(&program).code;
    debug!("Lowered {} to {} ({} bytes)", path.display(), target, code.len());
    Ok(code)
}

/// Rewrites ES module syntax in `program` into CommonJS. `source` must be the
/// text `program` was parsed from.
pub(crate) fn to_commonjs<'a>(program: &'a Program<'a>, source: &str) -> String {
    // Binds every identifier to its symbol
    let semantic = SemanticBuilder::new().build(program).semantic;
    let mut rewrite = Rewrite::new(program);

    if let Some(hashbang) = &program.hashbang {
        rewrite.remove(hashbang.span);
    }

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => rewrite.import(decl),
            Statement::ExportNamedDeclaration(decl) => rewrite.export_named(decl),
            Statement::ExportDefaultDeclaration(decl) => rewrite.export_default(decl, source),
            Statement::ExportAllDeclaration(decl) => rewrite.export_all(decl),
            _ => {}
        }
    }
    rewrite.rewrite_references(program, semantic.scoping());

    rewrite.finish(source)
}

/// A replacement of `source[start..end]`. Insertions have `start == end`.
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

/// What an export getter returns.
enum ExportValue {
    /// A module-level binding, which may itself be an import.
    Local(String),
    Expr(String),
}

struct Rewrite {
    names: HashSet<String>,
    edits: Vec<Edit>,
    is_esm: bool,
    /// `(specifier, binding)` for every module required by the prelude.
    requires: Vec<(String, String)>,
    /// `(binding, interop binding)` for modules with a default import.
    interops: Vec<(String, String)>,
    /// Expression replacing each imported local binding, by symbol and by name.
    imported: HashMap<SymbolId, String>,
    imported_names: HashMap<String, String>,
    /// Statements run after the exports are defined, in source order.
    imports: Vec<String>,
    /// `(exported name, value)` published as getters.
    exports: Vec<(String, ExportValue)>,
    /// Bindings whose keys are re-exported by `export *`.
    star_exports: Vec<String>,
}

impl Rewrite {
    fn new(program: &Program<'_>) -> Self {
        let mut collector = NameCollector::default();
        collector.visit_program(program);
        Self {
            names: collector.names,
            edits: Vec::new(),
            is_esm: false,
            requires: Vec::new(),
            interops: Vec::new(),
            imported: HashMap::new(),
            imported_names: HashMap::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            star_exports: Vec::new(),
        }
    }

    fn remove(&mut self, span: Span) {
        self.replace(span.start, span.end, String::new());
    }

    fn replace(&mut self, start: u32, end: u32, text: String) {
        self.edits.push(Edit { start: start as usize, end: end as usize, text });
    }

    /// Returns the binding holding `require(specifier)`, emitting it on first use.
    fn require(&mut self, specifier: &str) -> String {
        if let Some((_, binding)) = self.requires.iter().find(|(s, _)| s == specifier) {
            return binding.clone();
        }
        let binding = self.fresh_name(specifier);
        trace!("Binding '{}' to {}", specifier, binding);
        self.imports.push(format!("var {binding} = require({});", string_literal(specifier)));
        self.requires.push((specifier.to_string(), binding.clone()));
        binding
    }

    /// Returns `binding` wrapped so that `.default` works for CommonJS modules too.
    fn interop(&mut self, binding: &str) -> String {
        if let Some((_, interop)) = self.interops.iter().find(|(b, _)| b == binding) {
            return interop.clone();
        }
        let interop = self.unique(format!("{binding}Default"));
        self.imports.push(format!(
            "var {interop} = {binding} && {binding}.__esModule ? {binding} : {{ default: {binding} }};"
        ));
        self.interops.push((binding.to_string(), interop.clone()));
        interop
    }

    /// `_stem` for `./dir/stem.js`, suffixed until it clashes with nothing in the module.
    fn fresh_name(&mut self, specifier: &str) -> String {
        let file = specifier.rsplit('/').next().unwrap_or(specifier);
        let stem = file.split('.').next().filter(|s| !s.is_empty()).unwrap_or("module");
        let stem: String =
            stem.chars().map(|c| if is_identifier_part(c) { c } else { '_' }).collect();
        self.unique(format!("_{stem}"))
    }

    fn unique(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        let mut n = 2;
        while self.names.contains(&candidate) {
            candidate = format!("{base}{n}");
            n += 1;
        }
        self.names.insert(candidate.clone());
        candidate
    }

    fn export(&mut self, name: impl Into<String>, value: ExportValue) {
        self.exports.push((name.into(), value));
    }

    fn bind_import(&mut self, local: &BindingIdentifier<'_>, expr: String) {
        trace!("Import '{}' reads {}", local.name, expr);
        if let Some(symbol_id) = local.symbol_id.get() {
            self.imported.insert(symbol_id, expr.clone());
        }
        self.imported_names.insert(local.name.to_string(), expr);
    }

    fn import(&mut self, decl: &ImportDeclaration<'_>) {
        self.is_esm = true;
        self.remove(decl.span);
        if decl.import_kind.is_type() {
            return;
        }

        let binding = self.require(decl.source.value.as_str());
        let Some(specifiers) = &decl.specifiers else {
            return;
        };
        for spec in specifiers {
            match spec {
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    let interop = self.interop(&binding);
                    self.bind_import(&s.local, format!("{interop}.default"));
                }
                ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    if s.import_kind.is_type() {
                        continue;
                    }
                    let expr = member_access(&binding, s.imported.name().as_str());
                    self.bind_import(&s.local, expr);
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                    self.bind_import(&s.local, binding.clone());
                }
            }
        }
    }

    fn export_named(&mut self, decl: &ExportNamedDeclaration<'_>) {
        self.is_esm = true;
        if decl.export_kind.is_type() {
            self.remove(decl.span);
            return;
        }

        if let Some(declaration) = &decl.declaration {
            // Keep the declaration, drop the `export` keyword
            self.replace(decl.span.start, declaration.span().start, String::new());
            let mut names = Vec::new();
            declared_names(declaration, &mut names);
            for name in names {
                self.export(name.clone(), ExportValue::Local(name));
            }
            return;
        }

        self.remove(decl.span);
        let binding = decl.source.as_ref().map(|source| self.require(source.value.as_str()));
        for spec in &decl.specifiers {
            if spec.export_kind.is_type() {
                continue;
            }
            let local = spec.local.name();
            let value = match &binding {
                Some(binding) => ExportValue::Expr(member_access(binding, local.as_str())),
                None => ExportValue::Local(local.to_string()),
            };
            self.export(spec.exported.name().to_string(), value);
        }
    }

    fn export_default(&mut self, decl: &ExportDefaultDeclaration<'_>, source: &str) {
        self.is_esm = true;
        let body = decl.declaration.span();

        let named = match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(f) => f.id.as_ref(),
            ExportDefaultDeclarationKind::ClassDeclaration(c) => c.id.as_ref(),
            ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => {
                self.remove(decl.span);
                return;
            }
            _ => None,
        };

        if let Some(id) = named {
            self.replace(decl.span.start, body.start, String::new());
            self.export("default", ExportValue::Local(id.name.to_string()));
            return;
        }

        self.replace(decl.span.start, body.start, "exports.default = ".to_string());
        let text = &source[decl.span.start as usize..decl.span.end as usize];
        if !text.trim_end().ends_with(';') {
            self.replace(decl.span.end, decl.span.end, ";".to_string());
        }
    }

    fn export_all(&mut self, decl: &ExportAllDeclaration<'_>) {
        self.is_esm = true;
        self.remove(decl.span);
        if decl.export_kind.is_type() {
            return;
        }

        let binding = self.require(decl.source.value.as_str());
        match &decl.exported {
            Some(exported) => self.export(exported.name().to_string(), ExportValue::Expr(binding)),
            None => self.star_exports.push(binding),
        }
    }

    /// Replaces every reference to an imported binding with its member access.
    fn rewrite_references(&mut self, program: &Program<'_>, scoping: &Scoping) {
        if self.imported.is_empty() {
            return;
        }
        let mut references =
            ImportReferences { scoping, imported: &self.imported, edits: Vec::new() };
        for stmt in &program.body {
            match stmt {
                // Removed wholesale, their specifiers are handled above
                Statement::ImportDeclaration(_) | Statement::ExportAllDeclaration(_) => {}
                Statement::ExportNamedDeclaration(decl) => {
                    if !decl.export_kind.is_type()
                        && let Some(declaration) = &decl.declaration
                    {
                        references.visit_declaration(declaration);
                    }
                }
                Statement::ExportDefaultDeclaration(decl)
                    if matches!(
                        decl.declaration,
                        ExportDefaultDeclarationKind::TSInterfaceDeclaration(_)
                    ) => {}
                _ => references.visit_statement(stmt),
            }
        }
        let edits = references.edits;
        debug!("Rewrote {} references to imported bindings", edits.len());
        self.edits.extend(edits);
    }

    fn finish(self, source: &str) -> String {
        let mut out = String::with_capacity(source.len() + 256);
        out.push_str("\"use strict\";\n");

        if self.is_esm {
            out.push_str("Object.defineProperty(exports, \"__esModule\", { value: true });\n");
        }
        // Exports go first so modules in a cycle can already see them
        for (name, value) in &self.exports {
            let expr = match value {
                ExportValue::Local(local) => {
                    self.imported_names.get(local).map_or(local.as_str(), String::as_str)
                }
                ExportValue::Expr(expr) => expr.as_str(),
            };
            out.push_str(&format!(
                "Object.defineProperty(exports, {}, {{ enumerable: true, get: function () {{ return {expr}; }} }});\n",
                string_literal(name)
            ));
        }
        for line in &self.imports {
            out.push_str(line);
            out.push('\n');
        }
        for binding in &self.star_exports {
            out.push_str(&format!(
                "Object.keys({binding}).forEach(function (key) {{ if (key === \"default\" || key === \"__esModule\" || Object.prototype.hasOwnProperty.call(exports, key)) return; Object.defineProperty(exports, key, {{ enumerable: true, get: function () {{ return {binding}[key]; }} }}); }});\n"
            ));
        }

        let mut edits = self.edits;
        edits.sort_by_key(|e| (e.start, e.end));
        let mut cursor = 0;
        for edit in edits {
            out.push_str(&source[cursor..edit.start]);
            out.push_str(&edit.text);
            cursor = edit.end;
        }
        out.push_str(&source[cursor..]);
        out
    }
}

fn declared_names(declaration: &Declaration<'_>, out: &mut Vec<String>) {
    match declaration {
        Declaration::VariableDeclaration(var) => {
            for declarator in &var.declarations {
                pattern_names(&declarator.id, out);
            }
        }
        Declaration::FunctionDeclaration(f) => out.extend(f.id.as_ref().map(|id| id.name.to_string())),
        Declaration::ClassDeclaration(c) => out.extend(c.id.as_ref().map(|id| id.name.to_string())),
        _ => {}
    }
}

fn pattern_names(pattern: &BindingPattern<'_>, out: &mut Vec<String>) {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(id) => out.push(id.name.to_string()),
        BindingPatternKind::ObjectPattern(obj) => {
            for prop in &obj.properties {
                pattern_names(&prop.value, out);
            }
            if let Some(rest) = &obj.rest {
                pattern_names(&rest.argument, out);
            }
        }
        BindingPatternKind::ArrayPattern(arr) => {
            for element in arr.elements.iter().flatten() {
                pattern_names(element, out);
            }
            if let Some(rest) = &arr.rest {
                pattern_names(&rest.argument, out);
            }
        }
        BindingPatternKind::AssignmentPattern(assign) => pattern_names(&assign.left, out),
    }
}

/// Collects replacements for references that resolve to an imported binding.
struct ImportReferences<'s> {
    scoping: &'s Scoping,
    imported: &'s HashMap<SymbolId, String>,
    edits: Vec<Edit>,
}

impl<'s> ImportReferences<'s> {
    fn target(&self, ident: &IdentifierReference<'_>) -> Option<&'s String> {
        let reference_id = ident.reference_id.get()?;
        let symbol_id = self.scoping.get_reference(reference_id).symbol_id()?;
        let imported: &'s HashMap<SymbolId, String> = self.imported;
        imported.get(&symbol_id)
    }

    fn replace(&mut self, span: Span, text: String) {
        self.edits.push(Edit { start: span.start as usize, end: span.end as usize, text });
    }
}

impl<'a> Visit<'a> for ImportReferences<'_> {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        if let Some(expr) = self.target(it) {
            self.replace(it.span, expr.clone());
        }
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        // Called without the module object as `this`
        if let Expression::Identifier(ident) = &it.callee
            && let Some(expr) = self.target(ident)
        {
            self.replace(ident.span, format!("(0, {expr})"));
            for argument in &it.arguments {
                self.visit_argument(argument);
            }
            return;
        }
        walk::walk_call_expression(self, it);
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        if it.shorthand
            && let Expression::Identifier(ident) = &it.value
            && let Some(expr) = self.target(ident)
        {
            self.replace(it.span, format!("{}: {expr}", ident.name));
            return;
        }
        walk::walk_object_property(self, it);
    }
}

/// Every identifier spelled anywhere in the module, plus the factory parameters.
struct NameCollector {
    names: HashSet<String>,
}

impl Default for NameCollector {
    fn default() -> Self {
        let names = ["require", "module", "exports"].iter().map(|s| s.to_string()).collect();
        Self { names }
    }
}

impl<'a> Visit<'a> for NameCollector {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        self.names.insert(it.name.to_string());
    }

    fn visit_binding_identifier(&mut self, it: &BindingIdentifier<'a>) {
        self.names.insert(it.name.to_string());
    }
}
