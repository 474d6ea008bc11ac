//! Optional-field parsing.
//!
//! The `optional_fields` setting is a comma separated list of
//! `group:key:value` entries. A group ending in `2` fills `optionalFields2`;
//! any other group fills `optionalFields1`. Entries with fewer than three
//! parts are skipped here; the validator rejects them before any submission.

use std::collections::BTreeMap;

use serde::Serialize;

/// Separator between entries.
pub const ENTRY_SEPARATOR: char = ',';

/// Separator between the parts of one entry.
pub const PART_SEPARATOR: char = ':';

/// Splits `input` on `separator`, dropping trailing empty segments.
///
/// `"a:b:"` yields `["a", "b"]`, and an empty input yields `[""]`.
#[must_use]
pub fn split_segments(input: &str, separator: char) -> Vec<&str> {
    let mut segments: Vec<&str> = input.split(separator).collect();
    while segments.len() > 1 && segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    if segments.len() == 1 && segments[0].is_empty() && !input.is_empty() {
        segments.clear();
    }
    segments
}

/// Key/value pairs for the two optional-field groups of an incident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionalFieldGroups {
    /// Pairs for `optionalFields1`.
    pub group1: BTreeMap<String, String>,
    /// Pairs for `optionalFields2`.
    pub group2: BTreeMap<String, String>,
}

impl OptionalFieldGroups {
    /// Parses an already rendered optional-fields string.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut groups = Self::default();
        if input.is_empty() {
            return groups;
        }

        for entry in split_segments(input, ENTRY_SEPARATOR) {
            let parts = split_segments(entry, PART_SEPARATOR);
            let [group, key, value, ..] = parts.as_slice() else {
                continue;
            };

            let target = if group.ends_with('2') {
                &mut groups.group2
            } else {
                &mut groups.group1
            };
            target.insert((*key).to_string(), (*value).to_string());
        }

        groups
    }

    /// Returns true if neither group has entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.group1.is_empty() && self.group2.is_empty()
    }
}
