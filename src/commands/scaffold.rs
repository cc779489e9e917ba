use clap::Args;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Path, PathBuf};

use gantry::project::{self, Project, Task, TypecheckConfig};
use gantry::scaffold::{Bootstrap, GenerateOutcome, Scaffold, DEFAULT_SCAFFOLD_FILE};
use gantry::LintConfig;

use super::CmdResult;

#[derive(Args)]
pub struct ScaffoldArgs {
    /// Fully-qualified project type, e.g. projen.typescript.TypeScriptProject
    fqn: Option<String>,

    /// Full bootstrap descriptor as a JSON spec (inline, @file, or - for stdin)
    #[arg(long, value_name = "JSON")]
    json: Option<String>,

    /// Directory the bootstrap file is written into
    #[arg(long, default_value = ".")]
    outdir: String,

    /// Path of the bootstrap file, relative to the output directory
    #[arg(long, default_value = DEFAULT_SCAFFOLD_FILE)]
    file: String,

    /// Project name (defaults to the output directory name)
    #[arg(long)]
    name: Option<String>,
}

#[derive(Serialize)]
pub struct ScaffoldOutput {
    #[serde(flatten)]
    outcome: GenerateOutcome,
    typecheck: TypecheckConfig,
    lint: LintConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_task: Option<Task>,
}

fn resolve_bootstrap(args: &ScaffoldArgs) -> gantry::Result<Bootstrap> {
    // Explicit --json spec always wins over the positional fqn
    if let Some(spec) = &args.json {
        return super::parse_json_spec(spec);
    }
    match &args.fqn {
        Some(fqn) => Ok(Bootstrap {
            fqn: fqn.clone(),
            args: serde_json::json!({}),
            comments: IndexMap::new(),
        }),
        None => Err(gantry::Error::validation_missing_argument(vec![
            "fqn".to_string(),
        ])),
    }
}

fn project_name_from_path(outdir: &Path) -> String {
    let canonical = outdir
        .canonicalize()
        .unwrap_or_else(|_| outdir.to_path_buf());
    canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

pub fn run_json(args: ScaffoldArgs) -> CmdResult<ScaffoldOutput> {
    let bootstrap = resolve_bootstrap(&args)?;

    let expanded = shellexpand::tilde(&args.outdir).to_string();
    let outdir = PathBuf::from(expanded);
    let name = match args.name {
        Some(name) => name,
        None => project_name_from_path(&outdir),
    };

    let mut project = Project::new(name, outdir);
    project.bootstrap = Some(bootstrap);

    let scaffold = Scaffold::with_file(&args.file);
    project::synthesize(&mut project, &[&scaffold])?;

    let outcome = scaffold.outcome().ok_or_else(|| {
        gantry::Error::internal_unexpected("Scaffold ran without recording an outcome")
    })?;

    let output = ScaffoldOutput {
        outcome,
        typecheck: project.typecheck.clone(),
        lint: project.lint.clone(),
        default_task: project.tasks.get(project::DEFAULT_TASK_NAME).cloned(),
    };
    Ok((output, 0))
}
