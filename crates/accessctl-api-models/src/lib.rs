#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the access instructor API.
//!
//! These types are the single source of truth for the JSON bodies exchanged
//! with the instructor server (`rule/find`, `rule/add`, `rule/update`,
//! `rule/remove`, `rule/run`, `licence/find`, `licence/add`,
//! `licence/remove`). Filter types serialise only the keys the user actually
//! supplied, so an absent key means "unconstrained" rather than "empty".

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Access level granted or denied by a rule, serialised as the server's
/// single-letter code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RuleType {
    /// No access for anyone.
    #[serde(rename = "N")]
    NoAccess,
    /// Open to the public.
    #[serde(rename = "P")]
    Public,
    /// Any registered user.
    #[serde(rename = "R")]
    RegisteredUser,
    /// A named group only.
    #[serde(rename = "G")]
    Group,
}

impl RuleType {
    /// The single-letter wire code for this rule type.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NoAccess => "N",
            Self::Public => "P",
            Self::RegisteredUser => "R",
            Self::Group => "G",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.code())
    }
}

/// A directory access rule as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    /// Server-assigned rule identifier.
    pub id: u64,
    /// Directory path the rule applies to.
    pub path: String,
    /// Access level the rule grants or denies.
    pub rule_type: RuleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Group granted access; only meaningful for [`RuleType::Group`] rules.
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Title of the licence attached to the rule, when one is attached.
    pub licence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Expiry date (`YYYY-MM-DD`), when the rule is time-limited.
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Free-text traceability comment.
    pub comment: Option<String>,
    #[serde(default, rename = "override")]
    /// Whether the rule cascades down through subdirectories.
    pub cascades: bool,
}

/// A licence record (reusable usage-terms document) as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Licence {
    /// Short unique code identifying the licence.
    pub code: String,
    /// Human-readable licence title.
    pub title: String,
    /// Link to the licence text.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Free-text traceability comment.
    pub comment: Option<String>,
    #[serde(default)]
    /// Category tags attached to the licence.
    pub category_tags: Vec<String>,
}

/// Rules that apply to one queried path, split into the three server-side
/// layers. The layers are disjoint by construction on the server; ordering
/// inside each layer is whatever the server returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathRuleSet {
    #[serde(default)]
    /// Rules defined directly on the queried path.
    pub rules: Vec<Rule>,
    #[serde(default)]
    /// Rules inherited from ancestor paths.
    pub sub_rules: Vec<Rule>,
    #[serde(default)]
    /// Override rules cascading onto the queried path.
    pub override_rules: Vec<Rule>,
}

/// Response of `rule/find`: either a per-path breakdown or a flat rule list.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FindRulesResponse {
    /// Per-path breakdown keyed by queried path.
    PathRules {
        /// Mapping from queried path to its layered rule sets.
        path_rules: BTreeMap<String, PathRuleSet>,
    },
    /// Flat list of matching rules.
    Flat(Vec<Rule>),
}

impl FindRulesResponse {
    /// Whether the response contains no rules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::PathRules { path_rules } => path_rules.values().all(|set| {
                set.rules.is_empty() && set.sub_rules.is_empty() && set.override_rules.is_empty()
            }),
            Self::Flat(rules) => rules.is_empty(),
        }
    }

    /// Direct rules only, across every queried path.
    #[must_use]
    pub fn direct_rules(&self) -> Vec<Rule> {
        match self {
            Self::PathRules { path_rules } => path_rules
                .values()
                .flat_map(|set| set.rules.iter().cloned())
                .collect(),
            Self::Flat(rules) => rules.clone(),
        }
    }

    /// Candidate rules for a pipeline run: direct rules, plus inherited
    /// sub-rules when `include_sub_rules` is set.
    #[must_use]
    pub fn candidate_rules(&self, include_sub_rules: bool) -> Vec<Rule> {
        match self {
            Self::PathRules { path_rules } => {
                let mut rules = Vec::new();
                for set in path_rules.values() {
                    rules.extend(set.rules.iter().cloned());
                    if include_sub_rules {
                        rules.extend(set.sub_rules.iter().cloned());
                    }
                }
                rules
            }
            Self::Flat(rules) => rules.clone(),
        }
    }
}

/// Filter payload for `rule/find` and `rule/remove`. Only user-supplied
/// values serialise; an absent key leaves that dimension unconstrained.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RuleFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Concrete target paths (already glob-expanded client-side).
    pub paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Restrict to one rule type.
    pub rule_type: Option<RuleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Restrict to rules granting access to this group.
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Restrict to rules expiring on this date.
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Restrict to rules carrying this comment.
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Restrict to rules attached to this licence code.
    pub licence_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Restrict to rules whose licence carries any of these tags.
    pub category_tags: Option<Vec<String>>,
    #[serde(rename = "override", skip_serializing_if = "Option::is_none")]
    /// Restrict to override (cascading) rules.
    pub cascades: Option<bool>,
}

/// Mutation payload for `rule/add`. Unlike the filters this is a full
/// record, so unset optional fields serialise as explicit nulls.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AddRulesRequest {
    /// Concrete target paths, one rule created per path.
    pub paths: Vec<String>,
    /// Access level of the new rules.
    pub rule_type: RuleType,
    /// Group granted access, required for [`RuleType::Group`].
    pub group: Option<String>,
    /// Expiry date (`YYYY-MM-DD`), when time-limited.
    pub expiry_date: Option<String>,
    /// Free-text traceability comment.
    pub comment: Option<String>,
    /// Code of the licence to attach.
    pub licence_code: Option<String>,
    #[serde(rename = "override")]
    /// Whether the new rules cascade down through subdirectories.
    pub cascades: bool,
}

/// Mutation payload for `rule/update`, keyed by rule identifier. Only the
/// fields being changed serialise.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpdateRuleRequest {
    /// Identifier of the rule being updated.
    pub rule_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// New path, when moving the rule.
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// New rule type.
    pub rule_type: Option<RuleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// New group.
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// New expiry date.
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// New comment.
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// New licence code.
    pub licence_code: Option<String>,
}

/// Mutation payload for `rule/run`, triggering the server-side pipeline for
/// one rule.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RunRuleRequest {
    /// Identifier of the rule to run.
    pub rule_id: u64,
}

/// Filter payload for `licence/find` and `licence/remove`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct LicenceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Restrict to this licence code.
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Restrict to this title.
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Restrict to this URL.
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Restrict to this comment.
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Restrict to licences carrying any of these tags.
    pub category_tags: Option<Vec<String>>,
}

/// Mutation payload for `licence/add`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AddLicenceRequest {
    /// Short unique code for the new licence.
    pub code: String,
    /// Human-readable title.
    pub title: Option<String>,
    /// Link to the licence text.
    pub url: String,
    /// Free-text traceability comment.
    pub comment: Option<String>,
    /// Category tags to attach.
    pub category_tags: Vec<String>,
}

/// Marker the server embeds in per-path `rule/add` errors when the path
/// already carries a matching rule.
const ALREADY_EXISTS_MARKER: &str = "already exists";

/// Parse a `rule/add` error body into the subset of `paths` the server
/// rejected as duplicates.
///
/// The server answers a conflicting batch with a JSON array parallel to the
/// submitted `paths`: accepted paths get an empty object, duplicates get an
/// object whose messages mention "already exists" (under `paths`, or
/// `path_pattern_str` on older deployments). Returns `None` when the body is
/// any other shape, in which case the caller must treat the response as a
/// hard failure.
#[must_use]
pub fn parse_add_conflicts(paths: &[String], body: &[u8]) -> Option<Vec<String>> {
    let entries: Vec<serde_json::Map<String, Value>> = serde_json::from_slice(body).ok()?;
    if entries.len() != paths.len() {
        return None;
    }

    let mut existing = Vec::new();
    for (path, entry) in paths.iter().zip(&entries) {
        if entry.is_empty() {
            continue;
        }
        if entry.values().all(value_mentions_duplicate) {
            existing.push(path.clone());
        } else {
            return None;
        }
    }

    if existing.is_empty() { None } else { Some(existing) }
}

fn value_mentions_duplicate(value: &Value) -> bool {
    match value {
        Value::String(message) => message.contains(ALREADY_EXISTS_MARKER),
        Value::Array(messages) => messages.iter().any(value_mentions_duplicate),
        _ => false,
    }
}
