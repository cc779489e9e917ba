//! Renders constructor argument objects into JavaScript source text.
//!
//! Values arrive as JSON. Objects carrying the reserved `$symbol` key render
//! as identifier paths and register the import they rely on; everything else
//! renders literally. Null entries inside objects are dropped. Comment
//! entries annotate rendered keys and list omitted ones as commented-out
//! lines, so the generated file documents options the author left unset.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::imports::Imports;

/// Reserved key marking an object as a symbol reference.
pub const SYMBOL_KEY: &str = "$symbol";

const INDENT: &str = "  ";

/// Rendered argument text plus the imports it relies on.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub text: String,
    pub imports: Imports,
}

/// Render a constructor argument object into a JavaScript object literal.
///
/// Keys render in the order the JSON map yields them. A comment whose key is
/// present in `args` becomes a trailing annotation; one whose key is absent
/// (or null) becomes a commented-out `key: undefined` line after the
/// rendered entries.
pub fn render_args(args: &Value, comments: &IndexMap<String, String>) -> Result<Rendered> {
    let Some(map) = args.as_object() else {
        return Err(Error::render_unsupported_value(
            "options",
            "constructor arguments must be a JSON object",
        ));
    };

    let mut imports = Imports::new();
    let mut lines = Vec::new();

    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        let rendered = render_value(value, &field_path("options", key), 1, &mut imports)?;
        let line = match comments.get(key) {
            Some(text) => format!("{}{}: {}, /* {} */", INDENT, render_key(key), rendered, text),
            None => format!("{}{}: {},", INDENT, render_key(key), rendered),
        };
        lines.push(line);
    }

    for (key, text) in comments {
        if is_present(map, key) {
            continue;
        }
        lines.push(format!(
            "{}// {}: undefined, /* {} */",
            INDENT,
            render_key(key),
            text
        ));
    }

    let text = if lines.is_empty() {
        "{}".to_string()
    } else {
        format!("{{\n{}\n}}", lines.join("\n"))
    };

    Ok(Rendered { text, imports })
}

fn is_present(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).map(|v| !v.is_null()).unwrap_or(false)
}

fn field_path(parent: &str, key: &str) -> String {
    format!("{}.{}", parent, key)
}

fn render_value(value: &Value, path: &str, depth: usize, imports: &mut Imports) -> Result<String> {
    match value {
        Value::Null => Err(Error::render_unsupported_value(
            path,
            "null is dropped from objects but has no rendering in this position",
        )),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(quote(s)),
        Value::Array(items) => {
            let mut parts = Vec::new();
            for (index, item) in items.iter().enumerate() {
                parts.push(render_value(
                    item,
                    &format!("{}[{}]", path, index),
                    depth,
                    imports,
                )?);
            }
            Ok(format!("[{}]", parts.join(", ")))
        }
        Value::Object(map) if map.contains_key(SYMBOL_KEY) => render_symbol(map, path, imports),
        Value::Object(map) => render_object(map, path, depth, imports),
    }
}

fn render_object(
    map: &Map<String, Value>,
    path: &str,
    depth: usize,
    imports: &mut Imports,
) -> Result<String> {
    let entry_indent = INDENT.repeat(depth + 1);
    let close_indent = INDENT.repeat(depth);

    let mut lines = Vec::new();
    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        let rendered = render_value(value, &field_path(path, key), depth + 1, imports)?;
        lines.push(format!("{}{}: {},", entry_indent, render_key(key), rendered));
    }

    if lines.is_empty() {
        return Ok("{}".to_string());
    }
    Ok(format!("{{\n{}\n{}}}", lines.join("\n"), close_indent))
}

/// Resolve a `$symbol` object into an identifier path, registering the
/// import it needs. The first segment names the module; the rest form the
/// expression, so `projen.typescript.TypeScriptProject` renders as
/// `typescript.TypeScriptProject` with `typescript` imported from `projen`.
fn render_symbol(map: &Map<String, Value>, path: &str, imports: &mut Imports) -> Result<String> {
    if map.len() != 1 {
        return Err(Error::render_unsupported_value(
            path,
            "an object carrying \"$symbol\" cannot have other keys",
        ));
    }

    let Some(fqn) = map.get(SYMBOL_KEY).and_then(Value::as_str) else {
        return Err(Error::render_unsupported_value(
            path,
            "\"$symbol\" must be a string",
        ));
    };

    let segments: Vec<&str> = fqn.split('.').collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return Err(Error::render_unsupported_value(
            path,
            format!("'{}' is not a module-qualified symbol", fqn),
        ));
    }

    imports.register(segments[0], segments[1]);
    Ok(segments[1..].join("."))
}

fn render_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
