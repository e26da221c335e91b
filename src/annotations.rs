//! Discovery of `CHECK-FIXES`, `CHECK-MESSAGES` and `CHECK-NOTES` prefixes.
//!
//! A test source opts into a verification kind simply by mentioning its
//! prefix. Each requested check suffix `S` turns the base label into
//! `LABEL-S` (or plain `LABEL` for the empty suffix) and the scanner records
//! which of those literal prefixes occur in the input.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::errors::{CheckError, Result};

static SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9\-]+$").unwrap());

/// The closed set of expectation kinds a test can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Fixes,
    Messages,
    Notes,
}

impl AnnotationKind {
    /// Verification order: fixes, then messages, then notes.
    pub const ALL: [AnnotationKind; 3] = [
        AnnotationKind::Fixes,
        AnnotationKind::Messages,
        AnnotationKind::Notes,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnnotationKind::Fixes => "CHECK-FIXES",
            AnnotationKind::Messages => "CHECK-MESSAGES",
            AnnotationKind::Notes => "CHECK-NOTES",
        }
    }

    /// The literal prefix for this kind under `suffix`.
    pub fn prefix_for(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            self.label().to_string()
        } else {
            format!("{}-{}", self.label(), suffix)
        }
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnnotationKind::Fixes => "fixes",
            AnnotationKind::Messages => "messages",
            AnnotationKind::Notes => "notes",
        };
        write!(f, "{}", name)
    }
}

/// The prefixes of one kind that were found, in suffix order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationPrefix {
    kind: AnnotationKind,
    found: bool,
    prefixes: Vec<String>,
}

impl AnnotationPrefix {
    pub fn new(kind: AnnotationKind) -> Self {
        Self {
            kind,
            found: false,
            prefixes: Vec::new(),
        }
    }

    /// Looks for this kind's prefix under `suffix`; records it on a hit.
    pub fn check(&mut self, suffix: &str, text: &str) -> bool {
        let prefix = self.kind.prefix_for(suffix);
        let hit = text.contains(&prefix);
        if hit {
            self.found = true;
            self.prefixes.push(prefix);
        }
        hit
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    /// Whether any requested suffix matched.
    pub fn is_found(&self) -> bool {
        self.found
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

/// All three kinds for one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSet {
    fixes: AnnotationPrefix,
    messages: AnnotationPrefix,
    notes: AnnotationPrefix,
}

impl Default for AnnotationSet {
    fn default() -> Self {
        Self {
            fixes: AnnotationPrefix::new(AnnotationKind::Fixes),
            messages: AnnotationPrefix::new(AnnotationKind::Messages),
            notes: AnnotationPrefix::new(AnnotationKind::Notes),
        }
    }
}

impl AnnotationSet {
    /// Classifies `text` for every suffix, in order.
    ///
    /// Fails on the first malformed suffix, on a suffix that declares both
    /// notes and messages, and on a suffix that declares nothing at all.
    pub fn scan(text: &str, suffixes: &[String]) -> Result<Self> {
        let mut set = Self::default();
        for suffix in suffixes {
            validate_suffix(suffix)?;

            let has_fix = set.fixes.check(suffix, text);
            let has_message = set.messages.check(suffix, text);
            let has_note = set.notes.check(suffix, text);
            debug!(
                suffix = %suffix,
                has_fix,
                has_message,
                has_note,
                "classified check suffix"
            );

            if has_note && has_message {
                return Err(CheckError::ConflictingPrefixes {
                    notes: AnnotationKind::Notes.prefix_for(suffix),
                    messages: AnnotationKind::Messages.prefix_for(suffix),
                });
            }

            if !(has_fix || has_message || has_note) {
                return Err(CheckError::MissingPrefixes {
                    fixes: AnnotationKind::Fixes.prefix_for(suffix),
                    messages: AnnotationKind::Messages.prefix_for(suffix),
                    notes: AnnotationKind::Notes.prefix_for(suffix),
                });
            }
        }

        // Unreachable for a non-empty suffix list.
        if !set.any_found() {
            return Err(CheckError::NoPrefixesFound);
        }
        Ok(set)
    }

    pub fn get(&self, kind: AnnotationKind) -> &AnnotationPrefix {
        match kind {
            AnnotationKind::Fixes => &self.fixes,
            AnnotationKind::Messages => &self.messages,
            AnnotationKind::Notes => &self.notes,
        }
    }

    pub fn any_found(&self) -> bool {
        AnnotationKind::ALL.iter().any(|k| self.get(*k).is_found())
    }
}

/// Empty suffixes are allowed; anything else must be `[A-Z0-9-]+`.
pub fn validate_suffix(suffix: &str) -> Result<()> {
    if !suffix.is_empty() && !SUFFIX_RE.is_match(suffix) {
        return Err(CheckError::InvalidSuffix {
            suffix: suffix.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffixes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_suffix_uses_bare_labels() {
        let set = AnnotationSet::scan("// CHECK-FIXES: int x = 1;", &suffixes(&[""])).unwrap();
        assert_eq!(set.get(AnnotationKind::Fixes).prefixes(), ["CHECK-FIXES"]);
        assert!(!set.get(AnnotationKind::Messages).is_found());
        assert!(!set.get(AnnotationKind::Notes).is_found());
    }

    #[test]
    fn prefixes_accumulate_in_suffix_order() {
        let text = "// CHECK-MESSAGES-B: warning\n// CHECK-MESSAGES-A: warning\n// CHECK-FIXES-B: y\n";
        let set = AnnotationSet::scan(text, &suffixes(&["A", "B"])).unwrap();
        assert_eq!(
            set.get(AnnotationKind::Messages).prefixes(),
            ["CHECK-MESSAGES-A", "CHECK-MESSAGES-B"]
        );
        assert_eq!(set.get(AnnotationKind::Fixes).prefixes(), ["CHECK-FIXES-B"]);
    }

    #[test]
    fn unannotated_suffix_is_fatal() {
        let text = "// CHECK-FIXES-A: x\n";
        let err = AnnotationSet::scan(text, &suffixes(&["A", "B"])).unwrap_err();
        match err {
            CheckError::MissingPrefixes {
                fixes,
                messages,
                notes,
            } => {
                assert_eq!(fixes, "CHECK-FIXES-B");
                assert_eq!(messages, "CHECK-MESSAGES-B");
                assert_eq!(notes, "CHECK-NOTES-B");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn notes_and_messages_conflict_per_suffix() {
        let text = "// CHECK-NOTES: note\n// CHECK-MESSAGES: warning\n";
        let err = AnnotationSet::scan(text, &suffixes(&[""])).unwrap_err();
        assert!(matches!(err, CheckError::ConflictingPrefixes { .. }));
    }

    #[test]
    fn notes_and_messages_may_use_different_suffixes() {
        let text = "// CHECK-NOTES-A: note\n// CHECK-MESSAGES-B: warning\n";
        let set = AnnotationSet::scan(text, &suffixes(&["A", "B"])).unwrap();
        assert_eq!(set.get(AnnotationKind::Notes).prefixes(), ["CHECK-NOTES-A"]);
        assert_eq!(
            set.get(AnnotationKind::Messages).prefixes(),
            ["CHECK-MESSAGES-B"]
        );
    }

    #[test]
    fn malformed_suffix_is_rejected_before_classification() {
        let err = AnnotationSet::scan("// CHECK-FIXES: x", &suffixes(&["bad suffix!"])).unwrap_err();
        assert!(matches!(err, CheckError::InvalidSuffix { suffix } if suffix == "bad suffix!"));
    }

    #[test]
    fn suffix_validation() {
        assert!(validate_suffix("").is_ok());
        assert!(validate_suffix("CXX-20").is_ok());
        assert!(validate_suffix("lower").is_err());
        assert!(validate_suffix("A_B").is_err());
    }

    #[test]
    fn empty_suffix_list_hits_the_post_condition() {
        let err = AnnotationSet::scan("// CHECK-FIXES: x", &[]).unwrap_err();
        assert!(matches!(err, CheckError::NoPrefixesFound));
    }
}
