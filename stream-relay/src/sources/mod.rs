//! Source bookkeeping and the two extraction strategies.
//!
//! Metadata-driven names come from the [`SourceRecord`] built while the stream
//! is read; text-driven names come from a trailing `Sources:` line in the
//! answer. [`extract_sources`] is the only place that decides between them.

use std::{collections::HashMap, fmt, str::FromStr};

use crate::{error::RelayError, frame::FileRef};

pub mod display_name;
pub mod text_sources;

/// One distinct document seen in stream metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Dedup key (file id, or filename when no id was given).
    pub key: String,
    pub file_id: Option<String>,
    pub name_hint: Option<String>,
}

impl SourceEntry {
    /// A hint that is not just the id repeated back.
    pub fn confident_name(&self) -> Option<&str> {
        self.name_hint
            .as_deref()
            .filter(|hint| Some(*hint) != self.file_id.as_deref())
    }

    /// Best name available without a lookup: hint, else key.
    pub fn fallback_name(&self) -> &str {
        self.name_hint.as_deref().unwrap_or(&self.key)
    }
}

/// Insertion-ordered, deduplicated map of documents seen in one stream.
#[derive(Debug, Default)]
pub struct SourceRecord {
    entries: Vec<SourceEntry>,
    index: HashMap<String, usize>,
}

impl SourceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `file`; returns `true` if it introduced a new document.
    ///
    /// A repeated key never adds an entry, but may fill in a missing hint.
    pub fn record(&mut self, file: FileRef) -> bool {
        let Some(key) = file.key().map(str::to_string) else {
            return false;
        };

        if let Some(&pos) = self.index.get(&key) {
            let entry = &mut self.entries[pos];
            if entry.name_hint.is_none() {
                entry.name_hint = file.name_hint;
            }
            return false;
        }

        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(SourceEntry {
            key,
            file_id: file.file_id,
            name_hint: file.name_hint,
        });
        true
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How metadata-driven and text-driven sources are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourcePolicy {
    /// Metadata names when there are any, otherwise the `Sources:` line.
    #[default]
    PreferMetadata,
    MetadataOnly,
    TextOnly,
    /// Metadata names first, then text names not already listed.
    Merge,
}

impl FromStr for SourcePolicy {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "prefer-metadata" | "metadata-first" => Ok(Self::PreferMetadata),
            "metadata-only" | "metadata" => Ok(Self::MetadataOnly),
            "text-only" | "text" => Ok(Self::TextOnly),
            "merge" => Ok(Self::Merge),
            _ => Err(RelayError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for SourcePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PreferMetadata => "prefer-metadata",
            Self::MetadataOnly => "metadata-only",
            Self::TextOnly => "text-only",
            Self::Merge => "merge",
        })
    }
}

/// Final source list for an answer.
///
/// `metadata` holds the resolved names of the [`SourceRecord`] entries, one
/// per distinct document, in first-seen order; it is returned as is.
pub fn extract_sources(policy: SourcePolicy, answer: &str, metadata: &[String]) -> Vec<String> {
    match policy {
        SourcePolicy::MetadataOnly => metadata.to_vec(),
        SourcePolicy::TextOnly => text_sources::sources_from_text(answer),
        SourcePolicy::PreferMetadata => {
            if metadata.is_empty() {
                text_sources::sources_from_text(answer)
            } else {
                metadata.to_vec()
            }
        }
        SourcePolicy::Merge => {
            let mut merged = metadata.to_vec();
            for name in text_sources::sources_from_text(answer) {
                if !merged.iter().any(|m| m.eq_ignore_ascii_case(&name)) {
                    merged.push(name);
                }
            }
            merged
        }
    }
}
