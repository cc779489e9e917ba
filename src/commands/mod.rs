use indexmap::IndexMap;
use std::io::Read;
use std::path::Path;

pub type CmdResult<T> = gantry::Result<(T, i32)>;

// ============================================================================
// JSON Input Parsing (CLI layer)
// ============================================================================

/// Read JSON spec from string, file (@path), or stdin (-).
pub(crate) fn read_json_spec_to_string(spec: &str) -> gantry::Result<String> {
    use std::io::IsTerminal;

    if spec.trim() == "-" {
        let mut buf = String::new();
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(gantry::Error::validation_invalid_argument(
                "json",
                "Cannot read JSON from stdin when stdin is a TTY",
                None,
                None,
            ));
        }
        stdin.read_to_string(&mut buf).map_err(|e| {
            gantry::Error::internal_io(e.to_string(), Some("read stdin".to_string()))
        })?;
        return Ok(buf);
    }

    if let Some(path) = spec.strip_prefix('@') {
        if path.trim().is_empty() {
            return Err(gantry::Error::validation_invalid_argument(
                "json",
                "Invalid JSON spec '@' (missing file path)",
                None,
                None,
            ));
        }
        return std::fs::read_to_string(Path::new(path)).map_err(|e| {
            gantry::Error::internal_io(e.to_string(), Some(format!("read {}", path)))
        });
    }

    Ok(spec.to_string())
}

/// Parse a JSON spec into a typed value, keeping a snippet for diagnostics.
pub(crate) fn parse_json_spec<T: serde::de::DeserializeOwned>(spec: &str) -> gantry::Result<T> {
    let raw = read_json_spec_to_string(spec)?;
    serde_json::from_str(&raw).map_err(|e| {
        gantry::Error::validation_invalid_json(
            e,
            Some("parse JSON spec".to_string()),
            Some(raw.chars().take(200).collect::<String>()),
        )
    })
}

/// Parse repeatable KEY=VALUE entries into an ordered map.
pub(crate) fn parse_env_entries(entries: &[String]) -> gantry::Result<IndexMap<String, String>> {
    let mut env = IndexMap::new();
    for entry in entries {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(gantry::Error::validation_invalid_argument(
                "env",
                format!("Invalid env entry '{}' (expected KEY=VALUE)", entry),
                None,
                None,
            ));
        };
        if key.is_empty() {
            return Err(gantry::Error::validation_invalid_argument(
                "env",
                format!("Invalid env entry '{}' (empty key)", entry),
                None,
                None,
            ));
        }
        env.insert(key.to_string(), value.to_string());
    }
    Ok(env)
}

pub mod scaffold;
pub mod step;

pub(crate) fn run_yaml(command: crate::Commands) -> gantry::Result<(String, i32)> {
    match command {
        crate::Commands::Step(args) => step::run_yaml(args),
        _ => Err(gantry::Error::validation_invalid_argument(
            "output_mode",
            "Command does not support YAML output",
            None,
            None,
        )),
    }
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run_json($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (gantry::Result<serde_json::Value>, i32) {
    crate::tty::status("gantry is working...");

    match command {
        crate::Commands::Step(args) => dispatch!(args, step),
        crate::Commands::Scaffold(args) => dispatch!(args, scaffold),

        // Special case: List uses raw output mode
        crate::Commands::List => {
            let err = gantry::Error::validation_invalid_argument(
                "output_mode",
                "List command uses raw output mode",
                None,
                None,
            );
            crate::output::map_cmd_result_to_json::<serde_json::Value>(Err(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_entries_keeps_order_and_splits_on_first_equals() {
        let entries = vec![
            "FIRST=1".to_string(),
            "CONN=host=db;port=5432".to_string(),
        ];
        let env = parse_env_entries(&entries).unwrap();

        let keys: Vec<&String> = env.keys().collect();
        assert_eq!(keys, ["FIRST", "CONN"]);
        assert_eq!(env["CONN"], "host=db;port=5432");
    }

    #[test]
    fn parse_env_entries_rejects_missing_equals() {
        let entries = vec!["NOVALUE".to_string()];
        let err = parse_env_entries(&entries).unwrap_err();
        assert_eq!(err.code, gantry::ErrorCode::ValidationInvalidArgument);
    }

    #[test]
    fn read_json_spec_reads_inline_text() {
        let spec = r#"{"tag": "v1.0.0"}"#;
        assert_eq!(read_json_spec_to_string(spec).unwrap(), spec);
    }

    #[test]
    fn read_json_spec_reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        write!(file, r#"{{"tag": "v2.0.0"}}"#).unwrap();

        let spec = format!("@{}", file.path().display());
        assert_eq!(
            read_json_spec_to_string(&spec).unwrap(),
            r#"{"tag": "v2.0.0"}"#
        );
    }

    #[test]
    fn read_json_spec_rejects_empty_file_path() {
        let err = read_json_spec_to_string("@").unwrap_err();
        assert_eq!(err.code, gantry::ErrorCode::ValidationInvalidArgument);
    }
}
