//! docker-compose helpers for stack aliases
//!
//! A stack's hostnames live twice in its compose file: once in the
//! `VIRTUAL_HOST` environment entry read by the proxy and once in the
//! `nz.sitehost.container.website.vhosts` label read by the control panel.
//! Both are comma-delimited lists inside a single `KEY=value` entry:
//!
//! ```yaml
//! services:
//!   web:
//!     environment:
//!       - FOO=bar
//!       - VIRTUAL_HOST=example.com,www.example.com
//!     labels:
//!       - nz.sitehost.container.website.vhosts=example.com,www.example.com
//! ```
//!
//! [`add_stack_alias`] appends a hostname to both lists without touching any
//! other entry.

use serde::Serialize;
use serde_yaml::Value;

use crate::error::Result;
use crate::response::Response;

/// List prefix of the vhosts entry within the `environment` section
pub const VHOSTS_KEY_ENVIRONMENTS: &str = "VIRTUAL_HOST";

/// List prefix of the vhosts entry within the `labels` section
pub const VHOSTS_KEY_LABELS: &str = "nz.sitehost.container.website.vhosts";

/// Stack info item holding the compose file
const DOCKER_FILE_ITEM: &str = "docker_file";

/// Result of [`add_stack_alias`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AliasOutcome {
    /// `services.<stack>` does not exist or is empty; nothing was changed
    StackNotFound,
    /// The alias held no hostname once trimmed; nothing was changed
    EmptyAlias,
    /// Both vhosts entries were found and now contain the alias
    Merged,
    /// At least one vhosts entry was missing
    ///
    /// The flags tell which sections were updated. An updated section stays
    /// updated, so the document may now differ from what the server has.
    PartiallyMerged { environment: bool, labels: bool },
}

impl AliasOutcome {
    fn from_sections(environment: bool, labels: bool) -> Self {
        if environment && labels {
            AliasOutcome::Merged
        } else {
            AliasOutcome::PartiallyMerged {
                environment,
                labels,
            }
        }
    }

    /// Tri-state view: `None` when nothing applied, else whether both merged
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AliasOutcome::StackNotFound | AliasOutcome::EmptyAlias => None,
            AliasOutcome::Merged => Some(true),
            AliasOutcome::PartiallyMerged { .. } => Some(false),
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, AliasOutcome::Merged)
    }
}

/// Add `alias` to the vhosts lists of the service named `stack`
///
/// The alias is trimmed and may itself be a comma-delimited list of
/// hostnames. Both sections are processed even when the first one has no
/// vhosts entry. Re-adding an alias that is already listed leaves the lists
/// unchanged.
pub fn add_stack_alias(document: &mut Value, stack: &str, alias: &str) -> AliasOutcome {
    let Some(service) = document
        .get_mut("services")
        .and_then(|services| services.get_mut(stack))
        .filter(|service| !service.is_null())
    else {
        return AliasOutcome::StackNotFound;
    };

    let hostnames = split_list(alias);
    if hostnames.is_empty() {
        return AliasOutcome::EmptyAlias;
    }

    let environment = service.get_mut("environment").is_some_and(|section| {
        push_values_to_section_list(section, VHOSTS_KEY_ENVIRONMENTS, &hostnames)
    });
    let labels = service
        .get_mut("labels")
        .is_some_and(|section| push_values_to_section_list(section, VHOSTS_KEY_LABELS, &hostnames));

    tracing::debug!(stack, alias, environment, labels, "alias merge");
    AliasOutcome::from_sections(environment, labels)
}

/// Append `values` to the comma-delimited list held by the `prefix` entry
///
/// Handles both compose forms of a section: a sequence of `KEY=value` strings
/// and a `KEY: value` mapping. Only the first matching entry is rewritten.
/// Returns false when the section has no such entry.
fn push_values_to_section_list(section: &mut Value, prefix: &str, values: &[&str]) -> bool {
    match section {
        Value::Sequence(entries) => {
            let lead = format!("{prefix}=");
            for entry in entries.iter_mut() {
                let Some(list) = entry.as_str().and_then(|s| s.strip_prefix(&lead)) else {
                    continue;
                };
                let merged = merge_list(list, values);
                *entry = Value::String(format!("{lead}{merged}"));
                return true;
            }
            false
        }
        Value::Mapping(entries) => match entries.get_mut(prefix) {
            Some(entry) => {
                let current = match entry {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    _ => return false,
                };
                *entry = Value::String(merge_list(&current, values));
                true
            }
            None => false,
        },
        _ => false,
    }
}

/// Non-empty trimmed items of a comma-delimited list
fn split_list(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Append to a comma-delimited list, keeping each item once in first-seen order
fn merge_list(list: &str, values: &[&str]) -> String {
    let mut items: Vec<&str> = Vec::new();
    for item in list.split(',').chain(values.iter().copied()) {
        if !item.is_empty() && !items.contains(&item) {
            items.push(item);
        }
    }
    items.join(",")
}

/// Decode the compose file carried by a stack info reply
///
/// Returns `Ok(None)` when the reply is invalid or has no `docker_file` text.
pub fn decode_compose_file(stack_info: &Response) -> Result<Option<Value>> {
    if !stack_info.is_valid() {
        return Ok(None);
    }
    match stack_info.data_str(DOCKER_FILE_ITEM) {
        Some(text) => Ok(Some(serde_yaml::from_str(text)?)),
        None => Ok(None),
    }
}

/// Encode a compose document back into the text the update endpoint expects
pub fn encode_compose_file(document: &Value) -> Result<String> {
    Ok(serde_yaml::to_string(document)?)
}
