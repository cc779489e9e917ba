// Public modules
pub mod error;
pub mod imports;
pub mod project;
pub mod render;
pub mod scaffold;
pub mod step;
pub mod steps;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use imports::Imports;
pub use project::{
    Component, LintConfig, LintOverride, Project, Task, TaskRegistry, TypecheckConfig,
};
pub use scaffold::{Bootstrap, GenerateOutcome, Scaffold};
pub use step::{JobStep, StepConfig, StepKind};
