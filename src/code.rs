//! Equipment tracking codes derived from free-text type names.
//!
//! "20ft Standard Container" becomes "20SC". On a clash the initials widen
//! ("20STCO", "20STACO", ...) and, as a last resort, a counter is appended.

use crate::types::EquipmentMasterEntry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

const FALLBACK: &str = "EQP";
const MIN_LEN: usize = 3;
const MAX_LEN: usize = 8;
const MAX_CONFLICT_LEVEL: usize = 3;
const MAX_WIDE_INITIALS: usize = 5;
const SUFFIX_LIMIT: u32 = 100;

const CONTAINER: &str = "container";
const STOP_WORDS: &[&str] = &[
    CONTAINER, "ft", "foot", "feet", "the", "and", "or", "of", "with", "for",
];

fn size_pattern() -> &'static Regex {
    static SIZE: OnceLock<Regex> = OnceLock::new();
    SIZE.get_or_init(|| Regex::new(r"(?i)([0-9]+)(ft|'|foot|feet)").expect("size regex"))
}

/// What to do when a numeric suffix pushes a code past 8 characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Truncation {
    /// Cap after suffixing. The suffix can be clipped off and the clash comes back.
    #[default]
    Legacy,
    /// Shorten the base so base + suffix fits, and check the capped form.
    FitSuffix,
}

/// Whether the "no usable words" fallback is checked against existing codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackCollisions {
    #[default]
    Skip,
    Resolve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodePolicy {
    pub truncation: Truncation,
    pub fallback_collisions: FallbackCollisions,
}

/// A generated code, tagged with the path that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedCode {
    /// Taken verbatim from master data
    MasterOverride(String),
    /// No descriptive words: "EQP", optionally behind the size digits
    Fallback(String),
    /// Built from size digits and initials
    Generated {
        code: String,
        /// Number of widening rounds used (0 = plain initials)
        conflict_level: usize,
        suffix: Option<u32>,
    },
}

impl GeneratedCode {
    pub fn as_str(&self) -> &str {
        match self {
            GeneratedCode::MasterOverride(code) | GeneratedCode::Fallback(code) => code,
            GeneratedCode::Generated { code, .. } => code,
        }
    }

    pub fn into_code(self) -> String {
        match self {
            GeneratedCode::MasterOverride(code) | GeneratedCode::Fallback(code) => code,
            GeneratedCode::Generated { code, .. } => code,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GeneratedCode::MasterOverride(_) => "master",
            GeneratedCode::Fallback(_) => "fallback",
            GeneratedCode::Generated { .. } => "generated",
        }
    }
}

impl std::fmt::Display for GeneratedCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CodeGenerator {
    policy: CodePolicy,
}

impl CodeGenerator {
    pub fn new(policy: CodePolicy) -> Self {
        Self { policy }
    }

    /// Just the code; `CodeGenerator::default().generate(..)` is the legacy behaviour
    pub fn generate(
        &self,
        type_name: &str,
        existing: &HashSet<String>,
        master: &[EquipmentMasterEntry],
    ) -> String {
        self.derive(type_name, existing, master).into_code()
    }

    pub fn derive(
        &self,
        type_name: &str,
        existing: &HashSet<String>,
        master: &[EquipmentMasterEntry],
    ) -> GeneratedCode {
        let name = type_name.trim();
        if name.is_empty() {
            return GeneratedCode::Fallback(FALLBACK.to_string());
        }

        if let Some(code) = master_code(name, master) {
            debug!(type_name = name, code, "using master data code");
            return GeneratedCode::MasterOverride(code.to_string());
        }

        let lowered = name.to_lowercase();
        let (prefix, rest) = split_size(&lowered);
        let words = descriptive_words(&rest);
        if words.is_empty() {
            return self.fallback(&prefix, existing);
        }

        let mut code = self.shape(format!("{}{}", prefix, initials(&words, 1)));
        let mut level = 1;
        while existing.contains(&code) && level <= MAX_CONFLICT_LEVEL {
            let wide: String = initials(&words, level + 1)
                .chars()
                .take(MAX_WIDE_INITIALS)
                .collect();
            code = self.shape(format!("{}{}", prefix, wide));
            level += 1;
        }

        let mut suffix = None;
        if existing.contains(&code) {
            let (numbered, counter) = self.disambiguate(&code, existing);
            code = numbered;
            suffix = Some(counter);
        }

        let code = normalize_length(&code);
        debug!(type_name = name, %code, conflict_level = level - 1, ?suffix, "derived code");
        GeneratedCode::Generated {
            code,
            conflict_level: level - 1,
            suffix,
        }
    }

    fn fallback(&self, prefix: &str, existing: &HashSet<String>) -> GeneratedCode {
        let code = normalize_length(&format!("{}{}", prefix, FALLBACK));
        if self.policy.fallback_collisions == FallbackCollisions::Resolve
            && existing.contains(&code)
        {
            let (numbered, _) = self.disambiguate(&code, existing);
            return GeneratedCode::Fallback(normalize_length(&numbered));
        }
        GeneratedCode::Fallback(code)
    }

    /// Append 1, 2, ... until free. Gives up at the limit and returns the last try.
    fn disambiguate(&self, base: &str, existing: &HashSet<String>) -> (String, u32) {
        let mut candidate = base.to_string();
        let mut counter = 1;
        while counter < SUFFIX_LIMIT {
            candidate = match self.policy.truncation {
                Truncation::Legacy => format!("{}{}", base, counter),
                Truncation::FitSuffix => fit_suffix(base, counter),
            };
            if !existing.contains(&candidate) {
                return (candidate, counter);
            }
            counter += 1;
        }
        (candidate, counter - 1)
    }

    fn shape(&self, code: String) -> String {
        match self.policy.truncation {
            Truncation::Legacy => code,
            Truncation::FitSuffix => normalize_length(&code),
        }
    }
}

fn master_code<'a>(name: &str, master: &'a [EquipmentMasterEntry]) -> Option<&'a str> {
    let wanted = name.to_lowercase();
    master
        .iter()
        .find(|entry| entry.name.trim().to_lowercase() == wanted)
        .map(|entry| entry.code.as_str())
        .filter(|code| !code.trim().is_empty())
}

/// Pull the first "<digits>ft" style size out of the text: (digits, remainder)
fn split_size(text: &str) -> (String, String) {
    let Some(caps) = size_pattern().captures(text) else {
        return (String::new(), text.to_string());
    };
    match (caps.get(0), caps.get(1)) {
        (Some(whole), Some(digits)) => {
            let rest = format!("{} {}", &text[..whole.start()], &text[whole.end()..]);
            (digits.as_str().to_string(), rest)
        }
        _ => (String::new(), text.to_string()),
    }
}

/// Letter-only words with filler removed.
///
/// "container" only counts as filler when nothing else is left, so
/// "standard container" keeps both words while "container" alone is empty.
fn descriptive_words(text: &str) -> Vec<String> {
    let letters: String = text
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();
    let words: Vec<&str> = letters.split_whitespace().collect();

    if words.iter().all(|w| STOP_WORDS.contains(w)) {
        return Vec::new();
    }

    words
        .into_iter()
        .filter(|w| *w == CONTAINER || !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// First `width` letters of every word, uppercased
fn initials(words: &[String], width: usize) -> String {
    words
        .iter()
        .flat_map(|w| w.chars().take(width))
        .collect::<String>()
        .to_uppercase()
}

fn fit_suffix(base: &str, counter: u32) -> String {
    let digits = counter.to_string();
    let room = MAX_LEN.saturating_sub(digits.len());
    let head: String = base.chars().take(room).collect();
    normalize_length(&format!("{}{}", head, digits))
}

/// Pad with 'X' up to 3 characters, cut down to 8
fn normalize_length(code: &str) -> String {
    let mut code: String = code.chars().take(MAX_LEN).collect();
    while code.chars().count() < MIN_LEN {
        code.push('X');
    }
    code
}
