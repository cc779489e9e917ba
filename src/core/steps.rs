//! Builders for the step kinds this crate knows how to emit.
//!
//! Each builder takes a kind-specific options object, normalizes it through
//! [`step::build`], and returns a ready-to-serialize [`JobStep`]. Builders are
//! pure: no I/O, no failure paths. Required fields are enforced by the types,
//! not by runtime checks.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::step::{self, JobStep, StepConfig, StepKind};
use crate::utils::template::{self, TemplateVars};

/// External action references, pinned per kind and passed through verbatim.
pub const CHECKOUT_ACTION: &str = "actions/checkout@v3";
pub const UPLOAD_ARTIFACT_ACTION: &str = "actions/upload-artifact@v4";
pub const DOWNLOAD_ARTIFACT_ACTION: &str = "actions/download-artifact@v4";

// ============================================================================
// Checkout
// ============================================================================

/// Parameters for the checkout action.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutWith {
    /// Number of commits to fetch. The action's own default is 1.
    pub fetch_depth: Option<u32>,
    /// Token used to fetch the repository.
    pub token: Option<String>,
    /// Branch, tag, or SHA to check out.
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    /// Repository in `owner/name` form when not the current one.
    pub repository: Option<String>,
    /// Download Git LFS files. Emitted only when true.
    pub lfs: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutOptions {
    #[serde(flatten)]
    pub step: StepConfig,
    #[serde(default)]
    pub with: CheckoutWith,
}

impl StepKind for CheckoutWith {
    fn default_name(&self) -> &'static str {
        "Checkout"
    }

    fn action(&self) -> Option<&'static str> {
        Some(CHECKOUT_ACTION)
    }

    fn parameters(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("fetch-depth", json!(self.fetch_depth)),
            ("token", json!(self.token)),
            ("ref", json!(self.git_ref)),
            ("repository", json!(self.repository)),
            (
                "lfs",
                if self.lfs.unwrap_or(false) {
                    json!(true)
                } else {
                    Value::Null
                },
            ),
        ]
    }
}

/// Build a repository checkout step.
pub fn checkout(options: CheckoutOptions) -> JobStep {
    step::build(&options.with, &options.step)
}

// ============================================================================
// Upload artifact
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IfNoFilesFound {
    Error,
    Warn,
    Ignore,
}

/// Parameters for the upload-artifact action.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadArtifactWith {
    /// Artifact name; the action defaults to `artifact`.
    pub name: Option<String>,
    /// File, directory, or wildcard pattern describing what to upload.
    pub path: String,
    /// Replace an artifact with the same name. Defaults to true.
    pub overwrite: Option<bool>,
    pub if_no_files_found: Option<IfNoFilesFound>,
    /// Days before the artifact expires; the repository default applies
    /// when omitted.
    pub retention_days: Option<u32>,
    /// Zlib level 0-9. The action's own default is 6.
    pub compression_level: Option<u32>,
}

impl UploadArtifactWith {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            name: None,
            path: path.into(),
            overwrite: None,
            if_no_files_found: None,
            retention_days: None,
            compression_level: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadArtifactOptions {
    #[serde(flatten)]
    pub step: StepConfig,
    pub with: UploadArtifactWith,
}

impl StepKind for UploadArtifactWith {
    fn default_name(&self) -> &'static str {
        "Upload artifact"
    }

    fn action(&self) -> Option<&'static str> {
        Some(UPLOAD_ARTIFACT_ACTION)
    }

    fn parameters(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", json!(self.name)),
            ("path", json!(self.path)),
            ("overwrite", json!(self.overwrite.unwrap_or(true))),
            ("if-no-files-found", json!(self.if_no_files_found)),
            ("retention-days", json!(self.retention_days)),
            ("compression-level", json!(self.compression_level)),
        ]
    }
}

/// Build an artifact upload step. `overwrite` defaults to true.
pub fn upload_artifact(options: UploadArtifactOptions) -> JobStep {
    step::build(&options.with, &options.step)
}

// ============================================================================
// Download artifact
// ============================================================================

/// Parameters for the download-artifact action.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadArtifactWith {
    /// Artifact name; all artifacts of the run are downloaded when omitted.
    pub name: Option<String>,
    /// Destination path.
    pub path: Option<String>,
    /// Glob matching artifacts to download when no name is given.
    pub pattern: Option<String>,
    /// Merge matched artifacts into the same directory.
    pub merge_multiple: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadArtifactOptions {
    #[serde(flatten)]
    pub step: StepConfig,
    #[serde(default)]
    pub with: DownloadArtifactWith,
}

impl StepKind for DownloadArtifactWith {
    fn default_name(&self) -> &'static str {
        "Download artifact"
    }

    fn action(&self) -> Option<&'static str> {
        Some(DOWNLOAD_ARTIFACT_ACTION)
    }

    fn parameters(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", json!(self.name)),
            ("path", json!(self.path)),
            ("pattern", json!(self.pattern)),
            ("merge-multiple", json!(self.merge_multiple)),
        ]
    }
}

/// Build an artifact download step.
pub fn download_artifact(options: DownloadArtifactOptions) -> JobStep {
    step::build(&options.with, &options.step)
}

// ============================================================================
// Git identity
// ============================================================================

/// Committer identity written into the repository's git config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetupGitIdentityOptions {
    #[serde(flatten)]
    pub step: StepConfig,
    pub identity: GitIdentity,
}

impl StepKind for GitIdentity {
    fn default_name(&self) -> &'static str {
        "Set git identity"
    }

    fn script(&self) -> Option<String> {
        Some(git_identity_script(self))
    }
}

/// Build a step that configures `user.name` and `user.email`.
///
/// The identity fields are interpolated into the commands with no escaping
/// beyond double-quoting; callers supply safe values.
pub fn setup_git_identity(options: SetupGitIdentityOptions) -> JobStep {
    step::build(&options.identity, &options.step)
}

fn git_identity_script(identity: &GitIdentity) -> String {
    [
        template::render(
            "git config user.name \"{{name}}\"",
            &[(TemplateVars::NAME, &identity.name)],
        ),
        template::render(
            "git config user.email \"{{email}}\"",
            &[(TemplateVars::EMAIL, &identity.email)],
        ),
    ]
    .join("\n")
}

// ============================================================================
// Tag exists
// ============================================================================

/// Shell test that the tag variable is non-empty.
const TAG_SET_TEST: &str = "[ ! -z \"$TAG\" ]";
/// Remote query that exits non-zero when no matching tag exists.
const REMOTE_TAG_QUERY: &str = "git ls-remote -q --exit-code --tags origin $TAG";

struct TagExistsKind {
    tag: String,
}

impl StepKind for TagExistsKind {
    fn default_name(&self) -> &'static str {
        "Check if tag exists"
    }

    fn default_id(&self) -> Option<&'static str> {
        Some("check-tag")
    }

    fn script(&self) -> Option<String> {
        Some(tag_exists_script(&self.tag))
    }
}

/// Build a step that checks whether a tag exists on the `origin` remote.
///
/// Requires the repository to be checked out with its remote configured.
/// The step writes `exists=true` or `exists=false` to the workflow output
/// channel under its id (default `check-tag`), then echoes the channel for
/// the job log.
pub fn tag_exists(tag: &str, config: &StepConfig) -> JobStep {
    step::build(
        &TagExistsKind {
            tag: tag.to_string(),
        },
        config,
    )
}

fn tag_exists_script(tag: &str) -> String {
    let assign = template::render("TAG={{tag}}", &[(TemplateVars::TAG, tag)]);
    let branch = format!(
        "if {} && {}; then {}; else {}; fi",
        TAG_SET_TEST,
        REMOTE_TAG_QUERY,
        github_output_write("exists=true"),
        github_output_write("exists=false"),
    );

    [assign, branch, "cat $GITHUB_OUTPUT".to_string()].join("\n")
}

fn github_output_write(value: &str) -> String {
    format!("echo \"{}\" >> $GITHUB_OUTPUT", value)
}
