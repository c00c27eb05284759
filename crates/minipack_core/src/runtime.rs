//! The bootstrap that gives the bundled modules a `require` function.

use std::fmt;

/// Parameters every module factory is called with.
pub const FACTORY_PARAMS: [&str; 3] = ["require", "module", "exports"];

pub const UNKNOWN_MODULE_ERROR: &str = "UnknownModuleError";
pub const UNRESOLVED_SPECIFIER_ERROR: &str = "UnresolvedSpecifierError";

/// Loader emitted around the module table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Runtime {
    /// Run each factory at most once and hand out the same exports afterwards.
    pub cache_exports: bool,
    /// Module required once the table is built.
    pub entry: usize,
}

impl Runtime {
    /// Everything up to the module table argument: `(function (modules) { ... })(`.
    pub(crate) fn write_head(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(function (modules) {{")?;
        writeln!(f, "  var hasOwn = Object.prototype.hasOwnProperty;")?;
        if self.cache_exports {
            writeln!(f, "  var cache = {{}};")?;
        }
        writeln!(f)?;
        writeln!(f, "  function require(id) {{")?;
        writeln!(f, "    if (!hasOwn.call(modules, id)) {{")?;
        writeln!(
            f,
            "      throw new Error(\"{UNKNOWN_MODULE_ERROR}: no module with id \" + id);"
        )?;
        writeln!(f, "    }}")?;
        if self.cache_exports {
            writeln!(f, "    if (hasOwn.call(cache, id)) {{")?;
            writeln!(f, "      return cache[id].exports;")?;
            writeln!(f, "    }}")?;
        }
        writeln!(f, "    var fn = modules[id][0];")?;
        writeln!(f, "    var mapping = modules[id][1];")?;
        writeln!(f)?;
        writeln!(f, "    function localRequire(name) {{")?;
        writeln!(f, "      if (!hasOwn.call(mapping, name)) {{")?;
        writeln!(
            f,
            "        throw new Error(\"{UNRESOLVED_SPECIFIER_ERROR}: cannot resolve '\" + name + \"' from module \" + id);"
        )?;
        writeln!(f, "      }}")?;
        writeln!(f, "      return require(mapping[name]);")?;
        writeln!(f, "    }}")?;
        writeln!(f)?;
        writeln!(f, "    var module = {{ exports: {{}} }};")?;
        if self.cache_exports {
            writeln!(f, "    cache[id] = module;")?;
        }
        writeln!(f, "    fn(localRequire, module, module.exports);")?;
        writeln!(f)?;
        writeln!(f, "    return module.exports;")?;
        writeln!(f, "  }}")?;
        writeln!(f)?;
        writeln!(f, "  require({});", self.entry)?;
        write!(f, "}})(")
    }

    pub(crate) fn write_tail(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ");")
    }
}
