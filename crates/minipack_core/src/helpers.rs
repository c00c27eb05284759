//! Runtime helpers referenced by lowered code.
//!
//! `oxc_transformer` imports its helpers from `@oxc-project/runtime/helpers/<name>`.
//! Those specifiers never touch the filesystem: the graph builder turns each one
//! into a module whose source is embedded here.

use log::trace;

/// Prefix of every helper specifier emitted by the transformer.
pub(crate) const HELPER_PREFIX: &str = "@oxc-project/runtime/helpers/";

struct Helper {
    name: &'static str,
    /// Helpers whose bodies must precede this one, dependencies first.
    uses: &'static [&'static str],
    body: &'static str,
}

const HELPERS: &[Helper] = &[
    Helper {
        name: "toPrimitive",
        uses: &[],
        body: r#"function _toPrimitive(t, r) {
  if ("object" != typeof t || !t) return t;
  var e = t[Symbol.toPrimitive];
  if (void 0 !== e) {
    var i = e.call(t, r || "default");
    if ("object" != typeof i) return i;
    throw new TypeError("@@toPrimitive must return a primitive value.");
  }
  return ("string" === r ? String : Number)(t);
}"#,
    },
    Helper {
        name: "toPropertyKey",
        uses: &["toPrimitive"],
        body: r#"function _toPropertyKey(t) {
  var i = _toPrimitive(t, "string");
  return "symbol" == typeof i ? i : i + "";
}"#,
    },
    Helper {
        name: "defineProperty",
        uses: &["toPrimitive", "toPropertyKey"],
        body: r#"function _defineProperty(e, r, t) {
  if ((r = _toPropertyKey(r)) in e) {
    Object.defineProperty(e, r, { value: t, enumerable: true, configurable: true, writable: true });
  } else {
    e[r] = t;
  }
  return e;
}"#,
    },
    Helper {
        name: "objectSpread2",
        uses: &["toPrimitive", "toPropertyKey", "defineProperty"],
        body: r#"function ownKeys(e, r) {
  var t = Object.keys(e);
  if (Object.getOwnPropertySymbols) {
    var o = Object.getOwnPropertySymbols(e);
    if (r) o = o.filter(function (r) { return Object.getOwnPropertyDescriptor(e, r).enumerable; });
    t.push.apply(t, o);
  }
  return t;
}
function _objectSpread2(e) {
  for (var r = 1; r < arguments.length; r++) {
    var t = null != arguments[r] ? arguments[r] : {};
    if (r % 2) {
      ownKeys(Object(t), true).forEach(function (r) { _defineProperty(e, r, t[r]); });
    } else if (Object.getOwnPropertyDescriptors) {
      Object.defineProperties(e, Object.getOwnPropertyDescriptors(t));
    } else {
      ownKeys(Object(t)).forEach(function (r) {
        Object.defineProperty(e, r, Object.getOwnPropertyDescriptor(t, r));
      });
    }
  }
  return e;
}"#,
    },
    Helper {
        name: "extends",
        uses: &[],
        body: r#"function _extends() {
  _extends = Object.assign ? Object.assign.bind() : function (n) {
    for (var e = 1; e < arguments.length; e++) {
      var t = arguments[e];
      for (var r in t) if ({}.hasOwnProperty.call(t, r)) n[r] = t[r];
    }
    return n;
  };
  return _extends.apply(null, arguments);
}"#,
    },
    Helper {
        name: "objectWithoutPropertiesLoose",
        uses: &[],
        body: r#"function _objectWithoutPropertiesLoose(r, e) {
  if (null == r) return {};
  var t = {};
  for (var n in r) {
    if ({}.hasOwnProperty.call(r, n)) {
      if (-1 !== e.indexOf(n)) continue;
      t[n] = r[n];
    }
  }
  return t;
}"#,
    },
    Helper {
        name: "objectWithoutProperties",
        uses: &["objectWithoutPropertiesLoose"],
        body: r#"function _objectWithoutProperties(e, t) {
  if (null == e) return {};
  var o, r, i = _objectWithoutPropertiesLoose(e, t);
  if (Object.getOwnPropertySymbols) {
    var n = Object.getOwnPropertySymbols(e);
    for (r = 0; r < n.length; r++) {
      o = n[r];
      if (-1 === t.indexOf(o) && {}.propertyIsEnumerable.call(e, o)) i[o] = e[o];
    }
  }
  return i;
}"#,
    },
    Helper {
        name: "objectDestructuringEmpty",
        uses: &[],
        body: r#"function _objectDestructuringEmpty(t) {
  if (null == t) throw new TypeError("Cannot destructure " + t);
}"#,
    },
    Helper {
        name: "asyncToGenerator",
        uses: &[],
        body: r#"function asyncGeneratorStep(n, t, e, r, o, a, c) {
  try {
    var i = n[a](c), u = i.value;
  } catch (n) {
    e(n);
    return;
  }
  if (i.done) t(u); else Promise.resolve(u).then(r, o);
}
function _asyncToGenerator(n) {
  return function () {
    var t = this, e = arguments;
    return new Promise(function (r, o) {
      var a = n.apply(t, e);
      function _next(n) { asyncGeneratorStep(a, r, o, _next, _throw, "next", n); }
      function _throw(n) { asyncGeneratorStep(a, r, o, _next, _throw, "throw", n); }
      _next(void 0);
    });
  };
}"#,
    },
    Helper {
        name: "checkPrivateRedeclaration",
        uses: &[],
        body: r#"function _checkPrivateRedeclaration(e, t) {
  if (t.has(e)) throw new TypeError("Cannot initialize the same private elements twice on an object");
}"#,
    },
    Helper {
        name: "classPrivateFieldInitSpec",
        uses: &["checkPrivateRedeclaration"],
        body: r#"function _classPrivateFieldInitSpec(e, t, a) {
  _checkPrivateRedeclaration(e, t);
  t.set(e, a);
}"#,
    },
    Helper {
        name: "classPrivateMethodInitSpec",
        uses: &["checkPrivateRedeclaration"],
        body: r#"function _classPrivateMethodInitSpec(e, a) {
  _checkPrivateRedeclaration(e, a);
  a.add(e);
}"#,
    },
    Helper {
        name: "assertClassBrand",
        uses: &[],
        body: r#"function _assertClassBrand(e, t, n) {
  if ("function" == typeof e ? e === t : e.has(t)) return arguments.length < 3 ? t : n;
  throw new TypeError("Private element is not present on this object");
}"#,
    },
    Helper {
        name: "classPrivateFieldGet2",
        uses: &["assertClassBrand"],
        body: r#"function _classPrivateFieldGet2(s, a) {
  return s.get(_assertClassBrand(s, a));
}"#,
    },
    Helper {
        name: "classPrivateFieldSet2",
        uses: &["assertClassBrand"],
        body: r#"function _classPrivateFieldSet2(s, a, r) {
  s.set(_assertClassBrand(s, a), r);
  return r;
}"#,
    },
    Helper {
        name: "checkInRHS",
        uses: &[],
        body: r#"function _checkInRHS(e) {
  if (Object(e) !== e) throw new TypeError("right-hand side of 'in' should be an object, got " + (null !== e ? typeof e : "null"));
  return e;
}"#,
    },
    Helper {
        name: "readOnlyError",
        uses: &[],
        body: r#"function _readOnlyError(r) {
  throw new TypeError('"' + r + '" is read-only');
}"#,
    },
    Helper {
        name: "writeOnlyError",
        uses: &[],
        body: r#"function _writeOnlyError(r) {
  throw new TypeError('"' + r + '" is write-only');
}"#,
    },
];

fn find(name: &str) -> Option<&'static Helper> {
    HELPERS.iter().find(|h| h.name == name)
}

/// The helper name in `specifier`, if it points into the helper package.
pub(crate) fn helper_name(specifier: &str) -> Option<&str> {
    let name = specifier.strip_prefix(HELPER_PREFIX)?;
    Some(name.strip_suffix(".js").unwrap_or(name))
}

/// CommonJS source of the helper module `name`, or `None` when it is not bundled.
pub(crate) fn helper_source(name: &str) -> Option<String> {
    let helper = find(name)?;
    let mut source = String::new();
    for dependency in helper.uses.iter().filter_map(|n| find(n)) {
        source.push_str(dependency.body);
        source.push('\n');
    }
    source.push_str(helper.body);
    source.push_str(&format!("\nmodule.exports = _{};\n", helper.name));
    trace!("Embedding helper {} ({} bytes)", name, source.len());
    Some(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use oxc_allocator::Allocator;
    use oxc_span::SourceType;
    use std::path::Path;

    #[test]
    fn test_helper_name() {
        assert_eq!(helper_name("@oxc-project/runtime/helpers/objectSpread2"), Some("objectSpread2"));
        assert_eq!(helper_name("@oxc-project/runtime/helpers/extends.js"), Some("extends"));
        assert_eq!(helper_name("./objectSpread2.js"), None);
    }

    #[test]
    fn test_unknown_helper_has_no_source() {
        assert!(helper_source("usingCtx").is_none());
    }

    #[test]
    fn test_dependencies_are_complete() {
        for helper in HELPERS {
            for dependency in helper.uses {
                let dep = find(dependency).unwrap_or_else(|| panic!("{} uses unknown {}", helper.name, dependency));
                for transitive in dep.uses {
                    assert!(helper.uses.contains(transitive), "{} misses {}", helper.name, transitive);
                }
            }
        }
    }

    #[test]
    fn test_every_helper_is_a_valid_script() {
        for helper in HELPERS {
            let source = helper_source(helper.name).unwrap();
            assert!(source.ends_with(&format!("module.exports = _{};\n", helper.name)));
            let allocator = Allocator::default();
            let script = SourceType::default().with_module(false);
            if let Err(e) = parse(&allocator, Path::new(helper.name), &source, script) {
                panic!("helper {} does not parse: {e}", helper.name);
            }
        }
    }
}
