//! Generates the project bootstrap file and registers its tool config.
//!
//! The scaffold component owns one file, `.projenrc.ts` by default. During
//! the register phase it wires the default task and writes the file from the
//! project's bootstrap descriptor; during pre-synthesis it registers the
//! file with the typecheck and lint configs. Generation never touches an
//! existing file, so checking the generated definition into the repository
//! is safe.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::imports::Imports;
use crate::project::{Component, LintOverride, Project};
use crate::render;
use crate::utils::io;

pub const DEFAULT_SCAFFOLD_FILE: &str = ".projenrc.ts";
/// Directory for supporting definition files next to the bootstrap file.
pub const SCAFFOLD_DIR: &str = "projenrc";
pub const TSCONFIG_DEV_FILE: &str = "tsconfig.dev.json";

/// Descriptor naming the project type to instantiate and its arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]

pub struct Bootstrap {
    /// Dot-separated fully-qualified name, `module.path.Symbol`.
    pub fqn: String,
    #[serde(default = "default_args")]
    pub args: Value,
    /// Optional annotations keyed by argument name. Keys absent from `args`
    /// appear in the generated file as commented-out lines.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub comments: IndexMap<String, String>,
}

fn default_args() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Split a fully-qualified name into its module and symbol path.
///
/// The first segment names the module; the remaining segments form the
/// constructor expression. Fewer than two segments, or any empty segment,
/// is an invalid descriptor.
pub fn split_fqn(fqn: &str) -> Result<(&str, Vec<&str>)> {
    let segments: Vec<&str> = fqn.split('.').collect();
    if segments.len() < 2 {
        return Err(Error::scaffold_invalid_descriptor(
            fqn,
            "expected at least a module and a symbol",
        ));
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Err(Error::scaffold_invalid_descriptor(
            fqn,
            "empty segment in fully-qualified name",
        ));
    }
    Ok((segments[0], segments[1..].to_vec()))
}

/// What `generate` did, reported through command output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerateOutcome {
    Generated { path: PathBuf },
    SkippedExisting { path: PathBuf },
    SkippedNoBootstrap,
}

pub struct Scaffold {
    file_path: String,
    outcome: RefCell<Option<GenerateOutcome>>,
}

impl Scaffold {
    pub fn new() -> Self {
        Self::with_file(DEFAULT_SCAFFOLD_FILE)
    }

    pub fn with_file(path: impl Into<String>) -> Self {
        Self {
            file_path: path.into(),
            outcome: RefCell::new(None),
        }
    }

    /// Path of the bootstrap file, relative to the project outdir.
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Outcome of the last `generate` run, once a lifecycle phase ran it.
    pub fn outcome(&self) -> Option<GenerateOutcome> {
        self.outcome.borrow().clone()
    }

    /// Write the bootstrap file from the project's descriptor.
    ///
    /// Skips without touching disk when the file already exists or when the
    /// project carries no descriptor. The file is assembled as import
    /// statements, a constructor call with rendered arguments, and a
    /// closing synth call, then written atomically.
    pub fn generate(&self, project: &Project) -> Result<GenerateOutcome> {
        // Existence wins over every other gate; an existing file is trusted
        // verbatim even when no descriptor is configured.
        let path = project.outdir.join(&self.file_path);
        if path.exists() {
            return Ok(GenerateOutcome::SkippedExisting { path });
        }

        let Some(bootstrap) = project.bootstrap.as_ref() else {
            return Ok(GenerateOutcome::SkippedNoBootstrap);
        };

        let (module, symbol_path) = split_fqn(&bootstrap.fqn)?;

        let rendered = render::render_args(&bootstrap.args, &bootstrap.comments)?;

        let mut imports = Imports::new();
        imports.extend(rendered.imports);
        imports.register(module, symbol_path[0]);

        let mut lines = imports.esm_statements();
        lines.push(String::new());
        lines.push(format!(
            "const project = new {}({});",
            symbol_path.join("."),
            rendered.text
        ));
        lines.push(String::new());
        lines.push("project.synth();".to_string());
        let content = format!("{}\n", lines.join("\n"));

        if let Some(parent) = path.parent() {
            io::ensure_dir(parent, "create bootstrap directory")?;
        }
        io::write_file_atomic(&path, &content, "write bootstrap file")?;
        log_status!("scaffold", "Project definition created at {}", path.display());

        Ok(GenerateOutcome::Generated { path })
    }

    fn scaffold_dir_glob() -> String {
        format!("{}/**/*.ts", SCAFFOLD_DIR)
    }
}

impl Default for Scaffold {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Scaffold {
    fn name(&self) -> &str {
        "scaffold"
    }

    /// Wires the default task to run the definition file, then generates it.
    fn register(&self, project: &mut Project) -> Result<()> {
        project.tasks.default_task().exec(format!(
            "ts-node --project {} {}",
            TSCONFIG_DEV_FILE, self.file_path
        ));

        let outcome = self.generate(project)?;
        *self.outcome.borrow_mut() = Some(outcome);
        Ok(())
    }

    /// Registers the definition file and its support directory with the
    /// typecheck and lint configs. Re-running adds nothing new.
    fn pre_synthesize(&self, project: &mut Project) -> Result<()> {
        let dir_glob = Self::scaffold_dir_glob();

        project.typecheck.add_include(self.file_path.clone());
        project.typecheck.add_include(dir_glob.clone());

        project.lint.add_pattern(self.file_path.clone());
        project.lint.add_pattern(dir_glob.clone());
        project.lint.add_ignore_pattern(format!("!{}", self.file_path));
        project.lint.add_ignore_pattern(format!("!{}", dir_glob));
        project.lint.allow_dev_deps(self.file_path.clone());
        project.lint.allow_dev_deps(dir_glob);

        // The rule relaxations apply to the generated file alone, never to
        // the support directory.
        project.lint.add_override(LintOverride {
            files: vec![self.file_path.clone()],
            rules: [
                (
                    "@typescript-eslint/no-require-imports".to_string(),
                    Value::String("off".to_string()),
                ),
                (
                    "import/no-extraneous-dependencies".to_string(),
                    Value::String("off".to_string()),
                ),
            ]
            .into_iter()
            .collect(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::synthesize;
    use serde_json::json;

    fn project_with_bootstrap(outdir: &std::path::Path, fqn: &str, args: Value) -> Project {
        let mut project = Project::new("demo", outdir);
        project.bootstrap = Some(Bootstrap {
            fqn: fqn.to_string(),
            args,
            comments: IndexMap::new(),
        });
        project
    }

    #[test]
    fn default_file_name_is_projenrc_ts() {
        assert_eq!(Scaffold::new().file_path(), ".projenrc.ts");
    }

    #[test]
    fn bootstrap_defaults_empty_args() {
        let bootstrap: Bootstrap = serde_json::from_str(r#"{"fqn": "a.B"}"#).unwrap();
        assert_eq!(bootstrap.args, json!({}));
        assert!(bootstrap.comments.is_empty());
    }

    #[test]
    fn split_fqn_separates_module_from_symbol_path() {
        let (module, symbols) = split_fqn("projen.typescript.TypeScriptProject").unwrap();
        assert_eq!(module, "projen");
        assert_eq!(symbols, ["typescript", "TypeScriptProject"]);
    }

    #[test]
    fn split_fqn_rejects_single_segment() {
        let err = split_fqn("TypeScriptProject").unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ScaffoldInvalidDescriptor);
        assert_eq!(err.details["fqn"], "TypeScriptProject");
    }

    #[test]
    fn split_fqn_rejects_empty_segments() {
        assert!(split_fqn("pkg.").is_err());
        assert!(split_fqn(".Foo").is_err());
        assert!(split_fqn("pkg..Foo").is_err());
    }

    #[test]
    fn generate_skips_without_bootstrap() {
        let temp = tempfile::tempdir().unwrap();
        let project = Project::new("demo", temp.path());

        let outcome = Scaffold::new().generate(&project).unwrap();
        assert_eq!(outcome, GenerateOutcome::SkippedNoBootstrap);
        assert!(!temp.path().join(DEFAULT_SCAFFOLD_FILE).exists());
    }

    #[test]
    fn generate_writes_bootstrap_file() {
        let temp = tempfile::tempdir().unwrap();
        let project = project_with_bootstrap(temp.path(), "pkg.sub.Foo", json!({"a": 1}));

        let outcome = Scaffold::new().generate(&project).unwrap();
        let expected_path = temp.path().join(".projenrc.ts");
        assert_eq!(
            outcome,
            GenerateOutcome::Generated {
                path: expected_path.clone()
            }
        );

        let content = std::fs::read_to_string(expected_path).unwrap();
        assert_eq!(
            content,
            "import { sub } from \"pkg\";\n\
             \n\
             const project = new sub.Foo({\n  a: 1,\n});\n\
             \n\
             project.synth();\n"
        );
    }

    #[test]
    fn generate_never_touches_existing_file() {
        let temp = tempfile::tempdir().unwrap();
        let existing = temp.path().join(".projenrc.ts");
        std::fs::write(&existing, "// hand-written\n").unwrap();

        let project = project_with_bootstrap(temp.path(), "pkg.Foo", json!({}));
        let outcome = Scaffold::new().generate(&project).unwrap();

        assert_eq!(outcome, GenerateOutcome::SkippedExisting { path: existing.clone() });
        assert_eq!(
            std::fs::read_to_string(existing).unwrap(),
            "// hand-written\n"
        );
    }

    #[test]
    fn generate_reports_existing_file_even_without_bootstrap() {
        let temp = tempfile::tempdir().unwrap();
        let existing = temp.path().join(".projenrc.ts");
        std::fs::write(&existing, "// hand-written\n").unwrap();

        let project = Project::new("demo", temp.path());
        let outcome = Scaffold::new().generate(&project).unwrap();

        assert_eq!(outcome, GenerateOutcome::SkippedExisting { path: existing });
    }

    #[test]
    fn generate_rejects_malformed_fqn() {
        let temp = tempfile::tempdir().unwrap();
        let project = project_with_bootstrap(temp.path(), "TypeScriptProject", json!({}));

        let err = Scaffold::new().generate(&project).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ScaffoldInvalidDescriptor);
        assert!(!temp.path().join(DEFAULT_SCAFFOLD_FILE).exists());
    }

    #[test]
    fn generate_merges_symbol_reference_imports() {
        let temp = tempfile::tempdir().unwrap();
        let project = project_with_bootstrap(
            temp.path(),
            "projen.typescript.TypeScriptProject",
            json!({"sample": {"$symbol": "projen.web.ReactProject"}}),
        );

        Scaffold::new().generate(&project).unwrap();

        let content = std::fs::read_to_string(temp.path().join(".projenrc.ts")).unwrap();
        assert!(content.starts_with("import { typescript, web } from \"projen\";\n"));
        assert!(content.contains("new typescript.TypeScriptProject({"));
        assert!(content.contains("sample: web.ReactProject,"));
    }

    #[test]
    fn argument_imports_precede_own_symbol_import() {
        let temp = tempfile::tempdir().unwrap();
        let project = project_with_bootstrap(
            temp.path(),
            "projen.typescript.TypeScriptProject",
            json!({"construct": {"$symbol": "constructs.Construct"}}),
        );

        Scaffold::new().generate(&project).unwrap();

        let content = std::fs::read_to_string(temp.path().join(".projenrc.ts")).unwrap();
        assert!(content.starts_with(
            "import { Construct } from \"constructs\";\n\
             import { typescript } from \"projen\";\n"
        ));
    }

    #[test]
    fn generate_creates_parent_directories() {
        let temp = tempfile::tempdir().unwrap();
        let project = project_with_bootstrap(temp.path(), "pkg.Foo", json!({}));

        let scaffold = Scaffold::with_file("nested/dir/main.ts");
        let outcome = scaffold.generate(&project).unwrap();

        assert!(matches!(outcome, GenerateOutcome::Generated { .. }));
        assert!(temp.path().join("nested/dir/main.ts").exists());
    }

    #[test]
    fn register_wires_default_task_and_records_outcome() {
        let temp = tempfile::tempdir().unwrap();
        let mut project = project_with_bootstrap(temp.path(), "pkg.Foo", json!({}));

        let scaffold = Scaffold::new();
        scaffold.register(&mut project).unwrap();

        let task = project.tasks.get("default").unwrap();
        assert_eq!(
            task.steps,
            ["ts-node --project tsconfig.dev.json .projenrc.ts"]
        );
        assert!(matches!(
            scaffold.outcome(),
            Some(GenerateOutcome::Generated { .. })
        ));
    }

    #[test]
    fn component_name_identifies_scaffold() {
        assert_eq!(Scaffold::new().name(), "scaffold");
    }

    #[test]
    fn pre_synthesize_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let mut project = Project::new("demo", temp.path());

        let scaffold = Scaffold::new();
        scaffold.pre_synthesize(&mut project).unwrap();
        scaffold.pre_synthesize(&mut project).unwrap();

        assert_eq!(project.typecheck.include.len(), 2);
        assert_eq!(project.lint.patterns.len(), 2);
        assert_eq!(project.lint.ignore_patterns.len(), 2);
        assert_eq!(project.lint.allowed_dev_deps.len(), 2);
        assert_eq!(project.lint.overrides.len(), 1);

        let entry = &project.lint.overrides[0];
        assert_eq!(entry.files, [".projenrc.ts"]);
        assert_eq!(entry.rules.len(), 2);
    }

    #[test]
    fn lint_override_covers_generated_file_only() {
        let temp = tempfile::tempdir().unwrap();
        let mut project = Project::new("demo", temp.path());

        Scaffold::new().pre_synthesize(&mut project).unwrap();

        let entry = &project.lint.overrides[0];
        assert_eq!(entry.files, [".projenrc.ts"]);
        assert_eq!(entry.rules["@typescript-eslint/no-require-imports"], "off");
        assert_eq!(entry.rules["import/no-extraneous-dependencies"], "off");
    }

    #[test]
    fn synthesize_generates_file_and_registers_config() {
        let temp = tempfile::tempdir().unwrap();
        let mut project = project_with_bootstrap(temp.path(), "pkg.Foo", json!({"name": "demo"}));

        let scaffold = Scaffold::new();
        synthesize(&mut project, &[&scaffold]).unwrap();

        assert!(temp.path().join(".projenrc.ts").exists());
        assert!(project.lint.patterns.contains(".projenrc.ts"));
        assert!(project.typecheck.include.contains("projenrc/**/*.ts"));
        assert!(matches!(
            scaffold.outcome(),
            Some(GenerateOutcome::Generated { .. })
        ));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let skipped = serde_json::to_value(GenerateOutcome::SkippedNoBootstrap).unwrap();
        assert_eq!(skipped, json!({"status": "skipped_no_bootstrap"}));

        let generated = serde_json::to_value(GenerateOutcome::Generated {
            path: PathBuf::from("/tmp/.projenrc.ts"),
        })
        .unwrap();
        assert_eq!(generated["status"], "generated");
        assert_eq!(generated["path"], "/tmp/.projenrc.ts");
    }
}
