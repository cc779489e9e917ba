use clap::{Args, Subcommand};
use serde::Deserialize;

use gantry::step::StepConfig;
use gantry::steps::{
    self, CheckoutOptions, CheckoutWith, DownloadArtifactOptions, DownloadArtifactWith,
    GitIdentity, IfNoFilesFound, SetupGitIdentityOptions, UploadArtifactOptions,
    UploadArtifactWith,
};
use gantry::JobStep;

use super::CmdResult;

#[derive(Args)]
pub struct StepArgs {
    /// Print the bare step mapping as YAML instead of the JSON envelope
    #[arg(long, global = true)]
    pub yaml: bool,

    #[command(subcommand)]
    command: StepCommand,
}

#[derive(Subcommand)]
enum StepCommand {
    /// Build a repository checkout step
    Checkout {
        #[command(flatten)]
        common: CommonFlags,

        /// Number of commits to fetch (0 fetches full history)
        #[arg(long)]
        fetch_depth: Option<u32>,

        /// Token used to fetch the repository
        #[arg(long)]
        token: Option<String>,

        /// Branch, tag, or SHA to check out
        #[arg(long = "ref", value_name = "REF")]
        git_ref: Option<String>,

        /// Repository to check out, as owner/name
        #[arg(long)]
        repository: Option<String>,

        /// Download Git LFS files
        #[arg(long)]
        lfs: bool,

        /// Full options as a JSON spec (inline, @file, or - for stdin)
        #[arg(long, value_name = "JSON")]
        json: Option<String>,
    },

    /// Build an artifact upload step
    UploadArtifact {
        #[command(flatten)]
        common: CommonFlags,

        /// File or directory to upload
        path: Option<String>,

        /// Name for the uploaded artifact
        #[arg(long)]
        artifact_name: Option<String>,

        /// Keep an existing artifact with the same name instead of replacing it
        #[arg(long)]
        no_overwrite: bool,

        /// Behavior when no files match: error, warn, or ignore
        #[arg(long, value_name = "MODE")]
        if_no_files_found: Option<String>,

        /// Days before the artifact expires
        #[arg(long)]
        retention_days: Option<u32>,

        /// Zip compression level, 0 to 9
        #[arg(long)]
        compression_level: Option<u32>,

        /// Full options as a JSON spec (inline, @file, or - for stdin)
        #[arg(long, value_name = "JSON")]
        json: Option<String>,
    },

    /// Build an artifact download step
    DownloadArtifact {
        #[command(flatten)]
        common: CommonFlags,

        /// Name of the artifact to download (omit for all artifacts in the run)
        #[arg(long)]
        artifact_name: Option<String>,

        /// Destination path for the download
        #[arg(long)]
        path: Option<String>,

        /// Glob pattern matching artifacts to download
        #[arg(long)]
        pattern: Option<String>,

        /// Merge downloaded artifacts into the same directory
        #[arg(long)]
        merge_multiple: bool,

        /// Full options as a JSON spec (inline, @file, or - for stdin)
        #[arg(long, value_name = "JSON")]
        json: Option<String>,
    },

    /// Build a step that sets the git committer identity
    GitIdentity {
        #[command(flatten)]
        common: CommonFlags,

        /// Committer name
        #[arg(value_name = "NAME")]
        user_name: Option<String>,

        /// Committer email
        #[arg(value_name = "EMAIL")]
        email: Option<String>,

        /// Full options as a JSON spec (inline, @file, or - for stdin)
        #[arg(long, value_name = "JSON")]
        json: Option<String>,
    },

    /// Build a step that checks whether a tag exists on the remote
    TagExists {
        #[command(flatten)]
        common: CommonFlags,

        /// Tag to look up, e.g. v1.2.3
        tag: Option<String>,

        /// Full options as a JSON spec (inline, @file, or - for stdin)
        #[arg(long, value_name = "JSON")]
        json: Option<String>,
    },
}

/// Step fields shared by every kind, mapped onto [`StepConfig`].
#[derive(Args)]
struct CommonFlags {
    /// Display name for the step
    #[arg(long)]
    name: Option<String>,

    /// Step identifier referenced by later steps
    #[arg(long)]
    id: Option<String>,

    /// Conditional expression gating execution
    #[arg(long = "if", value_name = "EXPR")]
    condition: Option<String>,

    /// Continue the job when this step fails
    #[arg(long)]
    continue_on_error: bool,

    /// Environment variable for the step, as KEY=VALUE (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE")]
    env: Vec<String>,

    /// Minutes before the step is cancelled
    #[arg(long)]
    timeout_minutes: Option<u32>,

    /// Working directory for the step
    #[arg(long)]
    working_directory: Option<String>,
}

impl CommonFlags {
    fn into_config(self) -> gantry::Result<StepConfig> {
        let env = super::parse_env_entries(&self.env)?;
        Ok(StepConfig {
            name: self.name,
            id: self.id,
            condition: self.condition,
            continue_on_error: self.continue_on_error.then_some(true),
            env: if env.is_empty() { None } else { Some(env) },
            timeout_minutes: self.timeout_minutes,
            working_directory: self.working_directory,
        })
    }
}

/// JSON spec for `tag-exists`: common step fields plus the tag itself.
#[derive(Deserialize)]
struct TagExistsSpec {
    #[serde(flatten)]
    step: StepConfig,
    tag: String,
}

fn parse_if_no_files_found(value: &str) -> gantry::Result<IfNoFilesFound> {
    match value {
        "error" => Ok(IfNoFilesFound::Error),
        "warn" => Ok(IfNoFilesFound::Warn),
        "ignore" => Ok(IfNoFilesFound::Ignore),
        other => Err(gantry::Error::validation_invalid_argument(
            "if_no_files_found",
            format!("Unknown mode '{}'", other),
            None,
            Some(vec![
                "error".to_string(),
                "warn".to_string(),
                "ignore".to_string(),
            ]),
        )),
    }
}

fn build_step(command: StepCommand) -> gantry::Result<JobStep> {
    match command {
        StepCommand::Checkout {
            common,
            fetch_depth,
            token,
            git_ref,
            repository,
            lfs,
            json,
        } => {
            // Explicit --json spec always wins over individual flags
            if let Some(spec) = json {
                let options: CheckoutOptions = super::parse_json_spec(&spec)?;
                return Ok(steps::checkout(options));
            }
            let with = CheckoutWith {
                fetch_depth,
                token,
                git_ref,
                repository,
                lfs: lfs.then_some(true),
            };
            Ok(steps::checkout(CheckoutOptions {
                step: common.into_config()?,
                with,
            }))
        }

        StepCommand::UploadArtifact {
            common,
            path,
            artifact_name,
            no_overwrite,
            if_no_files_found,
            retention_days,
            compression_level,
            json,
        } => {
            if let Some(spec) = json {
                let options: UploadArtifactOptions = super::parse_json_spec(&spec)?;
                return Ok(steps::upload_artifact(options));
            }
            let Some(path) = path else {
                return Err(gantry::Error::validation_missing_argument(vec![
                    "path".to_string(),
                ]));
            };
            let mut with = UploadArtifactWith::new(path);
            with.name = artifact_name;
            with.overwrite = no_overwrite.then_some(false);
            with.if_no_files_found = match if_no_files_found {
                Some(mode) => Some(parse_if_no_files_found(&mode)?),
                None => None,
            };
            with.retention_days = retention_days;
            with.compression_level = compression_level;
            Ok(steps::upload_artifact(UploadArtifactOptions {
                step: common.into_config()?,
                with,
            }))
        }

        StepCommand::DownloadArtifact {
            common,
            artifact_name,
            path,
            pattern,
            merge_multiple,
            json,
        } => {
            if let Some(spec) = json {
                let options: DownloadArtifactOptions = super::parse_json_spec(&spec)?;
                return Ok(steps::download_artifact(options));
            }
            let with = DownloadArtifactWith {
                name: artifact_name,
                path,
                pattern,
                merge_multiple: merge_multiple.then_some(true),
            };
            Ok(steps::download_artifact(DownloadArtifactOptions {
                step: common.into_config()?,
                with,
            }))
        }

        StepCommand::GitIdentity {
            common,
            user_name,
            email,
            json,
        } => {
            if let Some(spec) = json {
                let options: SetupGitIdentityOptions = super::parse_json_spec(&spec)?;
                return Ok(steps::setup_git_identity(options));
            }
            match (user_name, email) {
                (Some(name), Some(email)) => {
                    Ok(steps::setup_git_identity(SetupGitIdentityOptions {
                        step: common.into_config()?,
                        identity: GitIdentity { name, email },
                    }))
                }
                (user_name, email) => {
                    let mut missing = Vec::new();
                    if user_name.is_none() {
                        missing.push("name".to_string());
                    }
                    if email.is_none() {
                        missing.push("email".to_string());
                    }
                    Err(gantry::Error::validation_missing_argument(missing))
                }
            }
        }

        StepCommand::TagExists { common, tag, json } => {
            if let Some(spec) = json {
                let parsed: TagExistsSpec = super::parse_json_spec(&spec)?;
                return Ok(steps::tag_exists(&parsed.tag, &parsed.step));
            }
            let Some(tag) = tag else {
                return Err(gantry::Error::validation_missing_argument(vec![
                    "tag".to_string(),
                ]));
            };
            Ok(steps::tag_exists(&tag, &common.into_config()?))
        }
    }
}

pub fn run_json(args: StepArgs) -> CmdResult<JobStep> {
    let step = build_step(args.command)?;
    Ok((step, 0))
}

pub(crate) fn run_yaml(args: StepArgs) -> gantry::Result<(String, i32)> {
    let step = build_step(args.command)?;
    let yaml = serde_yml::to_string(&step).map_err(|err| {
        gantry::Error::internal_unexpected(format!("YAML serialization failed: {}", err))
    })?;
    Ok((yaml, 0))
}
