//! Workflow step records and the normalization shared by every step kind.
//!
//! A [`JobStep`] is the serialized form of one unit of execution in a CI job:
//! either an invocation of a fixed external action (`uses` + `with`) or an
//! inline shell script (`run`). Field spelling follows the GitHub Actions
//! schema, and every absent field is omitted from output rather than
//! serialized as null.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Common configuration accepted by every step builder.
///
/// This is the full allowlist: keys outside it do not survive normalization,
/// so loose JSON input with extra fields deserializes to the same config as
/// input without them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepConfig {
    /// Display name; the step kind's default is substituted when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Step identifier, referenced by later steps' expressions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Conditional expression gating execution (the Actions `if` key).
    #[serde(alias = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
}

/// A normalized workflow step, ready for YAML or JSON emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(rename = "continue-on-error", skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<IndexMap<String, String>>,
    #[serde(rename = "timeout-minutes", skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u32>,
    #[serde(rename = "working-directory", skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with: Option<IndexMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
}

/// One buildable kind of workflow step.
///
/// Each kind carries its own parameter schema and either a fixed external
/// action reference or an inline script, never both. [`build`] turns a kind
/// plus common configuration into a [`JobStep`].
pub trait StepKind {
    /// Display name substituted when the caller provides none.
    fn default_name(&self) -> &'static str;

    /// Step identifier substituted when the caller provides none.
    fn default_id(&self) -> Option<&'static str> {
        None
    }

    /// Fixed external action reference, passed through verbatim.
    fn action(&self) -> Option<&'static str> {
        None
    }

    /// Inline script body for kinds that run shell commands.
    fn script(&self) -> Option<String> {
        None
    }

    /// Kind-specific parameter entries, before null-stripping.
    fn parameters(&self) -> Vec<(&'static str, Value)> {
        Vec::new()
    }
}

/// Drop null-valued entries and collapse a fully-empty map to absent.
///
/// Absent optional parameters arrive as `Value::Null` and must never appear
/// in output; a map that loses every entry collapses to `None` so empty
/// configuration never serializes as `with: {}`.
pub fn compact<K, I>(entries: I) -> Option<IndexMap<String, Value>>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    let map: IndexMap<String, Value> = entries
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.into(), value))
        .collect();

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

/// Merge a step kind with common configuration into a normalized step.
pub fn build(kind: &dyn StepKind, config: &StepConfig) -> JobStep {
    JobStep {
        name: config
            .name
            .clone()
            .or_else(|| Some(kind.default_name().to_string())),
        id: config
            .id
            .clone()
            .or_else(|| kind.default_id().map(str::to_string)),
        condition: config.condition.clone(),
        continue_on_error: config.continue_on_error,
        env: config.env.clone().filter(|env| !env.is_empty()),
        timeout_minutes: config.timeout_minutes,
        working_directory: config.working_directory.clone(),
        uses: kind.action().map(str::to_string),
        with: compact(kind.parameters()),
        run: kind.script(),
    }
}
