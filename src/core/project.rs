use crate::error::Result;
use crate::scaffold::Bootstrap;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Name of the task that runs when no task is named explicitly.
pub const DEFAULT_TASK_NAME: &str = "default";

#[derive(Debug, Clone, Serialize)]

pub struct Project {
    pub name: String,
    /// Directory generated files are written into.
    pub outdir: PathBuf,
    /// Descriptor for the bootstrap file, when one should be generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<Bootstrap>,
    pub typecheck: TypecheckConfig,
    pub lint: LintConfig,
    pub tasks: TaskRegistry,
}

impl Project {
    pub fn new(name: impl Into<String>, outdir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            outdir: outdir.into(),
            bootstrap: None,
            typecheck: TypecheckConfig::default(),
            lint: LintConfig::default(),
            tasks: TaskRegistry::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]

pub struct TypecheckConfig {
    /// Include globs for the development typecheck config.
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub include: IndexSet<String>,
}

impl TypecheckConfig {
    /// Returns false when the pattern was already registered.
    pub fn add_include(&mut self, pattern: impl Into<String>) -> bool {
        self.include.insert(pattern.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]

pub struct LintConfig {
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub patterns: IndexSet<String>,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub ignore_patterns: IndexSet<String>,
    /// Globs whose files may import development-only dependencies.
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub allowed_dev_deps: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<LintOverride>,
}

impl LintConfig {
    pub fn add_pattern(&mut self, pattern: impl Into<String>) -> bool {
        self.patterns.insert(pattern.into())
    }

    pub fn add_ignore_pattern(&mut self, pattern: impl Into<String>) -> bool {
        self.ignore_patterns.insert(pattern.into())
    }

    pub fn allow_dev_deps(&mut self, pattern: impl Into<String>) -> bool {
        self.allowed_dev_deps.insert(pattern.into())
    }

    /// Appends the override unless an identical one is already registered.
    pub fn add_override(&mut self, entry: LintOverride) -> bool {
        if self.overrides.contains(&entry) {
            return false;
        }
        self.overrides.push(entry);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]

pub struct LintOverride {
    pub files: Vec<String>,
    pub rules: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Default)]

pub struct TaskRegistry {
    tasks: IndexMap<String, Task>,
}

impl TaskRegistry {
    /// Fetch or create the task with the given name.
    pub fn register(&mut self, name: impl Into<String>) -> &mut Task {
        let name = name.into();
        self.tasks.entry(name.clone()).or_insert_with(|| Task {
            name,
            steps: Vec::new(),
        })
    }

    pub fn default_task(&mut self) -> &mut Task {
        self.register(DEFAULT_TASK_NAME)
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]

pub struct Task {
    pub name: String,
    /// Shell commands, run in registration order.
    pub steps: Vec<String>,
}

impl Task {
    pub fn exec(&mut self, command: impl Into<String>) {
        self.steps.push(command.into());
    }
}

/// A unit of project setup that participates in synthesis.
///
/// Synthesis runs two phases over every component: `register`, where a
/// component wires tasks and produces files, then `pre_synthesize`, where it
/// folds its configuration into the shared project state. Each phase sees
/// components in the order they were supplied.
pub trait Component {
    fn name(&self) -> &str;

    fn register(&self, project: &mut Project) -> Result<()>;

    /// Runs after every component has registered. Default is a no-op.
    fn pre_synthesize(&self, _project: &mut Project) -> Result<()> {
        Ok(())
    }
}

/// Run both lifecycle phases over `components`, register first.
pub fn synthesize(project: &mut Project, components: &[&dyn Component]) -> Result<()> {
    for component in components {
        log_status!("synth", "Running register phase for {}", component.name());
        component.register(project)?;
    }
    for component in components {
        log_status!("synth", "Running pre-synthesis phase for {}", component.name());
        component.pre_synthesize(project)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_include_dedupes_patterns() {
        let mut typecheck = TypecheckConfig::default();
        assert!(typecheck.add_include(".projenrc.ts"));
        assert!(!typecheck.add_include(".projenrc.ts"));
        assert_eq!(typecheck.include.len(), 1);
    }

    #[test]
    fn add_override_dedupes_identical_entries() {
        let entry = LintOverride {
            files: vec![".projenrc.ts".to_string()],
            rules: [("import/no-extraneous-dependencies".to_string(), json!("off"))]
                .into_iter()
                .collect(),
        };

        let mut lint = LintConfig::default();
        assert!(lint.add_override(entry.clone()));
        assert!(!lint.add_override(entry));
        assert_eq!(lint.overrides.len(), 1);
    }

    #[test]
    fn register_returns_same_task_for_same_name() {
        let mut tasks = TaskRegistry::default();
        tasks.register("build").exec("tsc");
        tasks.register("build").exec("jest");

        let task = tasks.get("build").unwrap();
        assert_eq!(task.steps, ["tsc", "jest"]);
    }

    #[test]
    fn default_task_is_shared() {
        let mut tasks = TaskRegistry::default();
        tasks.default_task().exec("first");
        tasks.default_task().exec("second");

        let task = tasks.get(DEFAULT_TASK_NAME).unwrap();
        assert_eq!(task.steps.len(), 2);
    }

    struct Recorder {
        name: &'static str,
    }

    impl Component for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn register(&self, project: &mut Project) -> Result<()> {
            project
                .tasks
                .register("trace")
                .exec(format!("{}:register", self.name));
            Ok(())
        }

        fn pre_synthesize(&self, project: &mut Project) -> Result<()> {
            project
                .tasks
                .register("trace")
                .exec(format!("{}:pre", self.name));
            Ok(())
        }
    }

    #[test]
    fn synthesize_finishes_all_registers_before_pre_synthesize() {
        let mut project = Project::new("demo", ".");
        let first = Recorder { name: "first" };
        let second = Recorder { name: "second" };

        synthesize(&mut project, &[&first, &second]).unwrap();

        let trace = project.tasks.get("trace").unwrap();
        assert_eq!(
            trace.steps,
            [
                "first:register",
                "second:register",
                "first:pre",
                "second:pre"
            ]
        );
    }
}
