//! Core data types shared across the crate.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A typed preference value.
///
/// Integer prefs are 32-bit on the host side, so values outside `i32` are
/// rejected at parse time rather than truncated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i32),
    String(String),
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Bool(b) => write!(f, "{}", b),
            PrefValue::Int(n) => write!(f, "{}", n),
            PrefValue::String(s) => write!(f, "\"{}\"", crate::utils::escape_string(s)),
        }
    }
}

/// Which declaration function introduced a preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefKind {
    /// `pref()`: sets the default value.
    Default,
    /// `user_pref()`: sets the user value, shadowing any default.
    User,
    /// `sticky_pref()`: a default that survives being set back to itself.
    Sticky,
    /// `lockPref()`: locked; the user cannot change it.
    Locked,
}

impl PrefKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "pref" => Some(PrefKind::Default),
            "user_pref" => Some(PrefKind::User),
            "sticky_pref" => Some(PrefKind::Sticky),
            "lockPref" => Some(PrefKind::Locked),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PrefKind::Default => "pref",
            PrefKind::User => "user_pref",
            PrefKind::Sticky => "sticky_pref",
            PrefKind::Locked => "lockPref",
        }
    }

    /// True for declarations meant to take precedence over any user-set value.
    pub fn override_user(self) -> bool {
        matches!(self, PrefKind::User | PrefKind::Locked)
    }
}

impl fmt::Display for PrefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single key/value assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreferenceEntry {
    pub key: String,
    pub value: PrefValue,
    pub kind: PrefKind,
}

impl PreferenceEntry {
    pub fn new(key: impl Into<String>, value: PrefValue, kind: PrefKind) -> Self {
        Self { key: key.into(), value, kind }
    }

    pub fn override_user(&self) -> bool {
        self.kind.override_user()
    }
}

/// A parsed entry together with the line its declaration started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub line: usize,
    pub entry: PreferenceEntry,
}

/// Ordered declarations loaded from one source document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlaySet {
    pub name: String,
    pub declarations: Vec<Declaration>,
}

impl OverlaySet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), declarations: Vec::new() }
    }

    /// Build an overlay from bare entries, numbering them as consecutive lines.
    pub fn from_entries(name: impl Into<String>, entries: Vec<PreferenceEntry>) -> Self {
        let declarations = entries
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| Declaration { line: idx + 1, entry })
            .collect();
        Self { name: name.into(), declarations }
    }

    pub fn entries(&self) -> impl Iterator<Item = &PreferenceEntry> {
        self.declarations.iter().map(|d| &d.entry)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// Where a declaration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub overlay: String,
    pub line: usize,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.overlay, self.line)
    }
}

/// Final key -> entry mapping after folding every overlay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergedPreferences {
    pub(crate) entries: BTreeMap<String, PreferenceEntry>,
}

impl MergedPreferences {
    pub fn get(&self, key: &str) -> Option<&PreferenceEntry> {
        self.entries.get(key)
    }

    pub fn value(&self, key: &str) -> Option<&PrefValue> {
        self.entries.get(key).map(|e| &e.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = &PreferenceEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, entry: PreferenceEntry) -> Option<PreferenceEntry> {
        self.entries.insert(entry.key.clone(), entry)
    }

    /// Re-express the merged set as an overlay so it can be stacked again.
    pub fn to_overlay(&self, name: impl Into<String>) -> OverlaySet {
        OverlaySet::from_entries(name, self.entries.values().cloned().collect())
    }

    /// Stable SHA-256 digest of the merged set.
    pub fn fingerprint(&self) -> String {
        crate::utils::merged_fingerprint(self)
    }
}

/// Output format for rendered preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Js,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "js" | "prefs" | "prefs.js" => Ok(OutputFormat::Js),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Invalid output format: {other} (expected js or json)")),
        }
    }
}

/// What to do with a declaration that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    #[default]
    Abort,
    Skip,
}

/// Tool configuration, loaded from file/env and overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Glob patterns selecting overlay files inside a preference directory.
    #[serde(deserialize_with = "deserialize_string_list")]
    pub include_globs: Vec<String>,
    /// Directory whose overlays are applied before any named files.
    pub pref_dir: Option<PathBuf>,
    pub format: OutputFormat,
    pub on_error: ErrorPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs().iter().map(|s| s.to_string()).collect(),
            pref_dir: None,
            format: OutputFormat::default(),
            on_error: ErrorPolicy::default(),
        }
    }
}

pub fn default_include_globs() -> &'static [&'static str] {
    &["*.js"]
}

/// Accept either a list or a comma-separated string.
fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    let items = match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => s.split(',').map(str::to_string).collect::<Vec<_>>(),
        StringOrList::Many(list) => list,
    };
    Ok(items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
}
