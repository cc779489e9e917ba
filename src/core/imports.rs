//! Import registry for generated bootstrap files.
//!
//! Collects module/symbol pairs while constructor arguments render, then
//! emits them as ESM or CJS statements. Modules keep first-registration
//! order; symbols within a module are sorted on output.

use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Clone, Default)]
pub struct Imports {
    modules: IndexMap<String, IndexSet<String>>,
}

impl Imports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `symbol` must be imported from `module`. Repeated
    /// registrations collapse into one entry.
    pub fn register(&mut self, module: impl Into<String>, symbol: impl Into<String>) {
        self.modules
            .entry(module.into())
            .or_default()
            .insert(symbol.into());
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Fold another registry into this one, keeping this one's module order.
    pub fn extend(&mut self, other: Imports) {
        for (module, symbols) in other.modules {
            self.modules.entry(module).or_default().extend(symbols);
        }
    }

    /// `import { a, b } from "module";` lines, one per module.
    pub fn esm_statements(&self) -> Vec<String> {
        self.statements(|module, symbols| format!("import {{ {} }} from \"{}\";", symbols, module))
    }

    /// `const { a, b } = require("module");` lines, one per module.
    pub fn cjs_statements(&self) -> Vec<String> {
        self.statements(|module, symbols| {
            format!("const {{ {} }} = require(\"{}\");", symbols, module)
        })
    }

    fn statements(&self, line: impl Fn(&str, &str) -> String) -> Vec<String> {
        self.modules
            .iter()
            .map(|(module, symbols)| {
                let mut names: Vec<&str> = symbols.iter().map(String::as_str).collect();
                names.sort_unstable();
                line(module, &names.join(", "))
            })
            .collect()
    }
}
