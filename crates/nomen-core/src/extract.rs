//! Text extractors over nomenclature node text
//!
//! Pure functions: no state, no I/O. Every extractor has a documented
//! fallback instead of an error path.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static CODE_RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z]\d{2,3}(?:\.\d+)?)\s*-\s*([A-Z]\d{2,3}(?:\.\d+)?)").unwrap()
});

static SINGLE_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]\d{2,3})").unwrap());

static REFERENCED_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Z]\d{2}(?:\.\d+)?)\)").unwrap());

/// Inclusive range of codes covered by a chapter or section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRange {
    pub start: String,
    pub end: String,
}

impl CodeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Parse a code range such as `A00-B99` or `(A00 - B99)`.
///
/// Falls back to a single code used as both endpoints, and finally to the
/// whole input text as both endpoints.
pub fn parse_code_range(text: &str) -> CodeRange {
    if let Some(caps) = CODE_RANGE_REGEX.captures(text) {
        return CodeRange::new(&caps[1], &caps[2]);
    }

    if let Some(caps) = SINGLE_CODE_REGEX.captures(text) {
        return CodeRange::new(&caps[1], &caps[1]);
    }

    CodeRange::new(text, text)
}

/// Whether the text contains anything that looks like a code
pub fn contains_code(text: &str) -> bool {
    SINGLE_CODE_REGEX.is_match(text)
}

/// First parenthesized code reference, e.g. `see also (A00.1)` → `A00.1`
pub fn extract_referenced_code(text: &str) -> Option<String> {
    REFERENCED_CODE_REGEX
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Chapter number from its name text; unparseable names map to 0
pub fn parse_chapter_number(name: &str) -> i32 {
    name.trim().parse().unwrap_or(0)
}

/// Truncate to at most `max` characters
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Clinical category derived from a code's leading letter block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeCategory {
    Infectious,
    Neoplasm,
    Blood,
    Endocrine,
    Mental,
    Nervous,
    Eye,
    Ear,
    Circulatory,
    Respiratory,
    Digestive,
    Skin,
    Musculoskeletal,
    Genitourinary,
    Obstetric,
    Perinatal,
    Congenital,
    Symptoms,
    Injury,
    ExternalCauses,
    HealthFactors,
    Other,
    Uncategorized,
}

impl CodeCategory {
    /// Classify a code by its first character.
    ///
    /// `D0`-`D4` are neoplasms and the rest of `D` is blood; `H` below `H60`
    /// is the eye block and the rest is the ear block.
    pub fn classify(code: &str) -> Self {
        let Some(prefix) = code.chars().next() else {
            return CodeCategory::Uncategorized;
        };

        match prefix {
            'A' | 'B' => CodeCategory::Infectious,
            'C' => CodeCategory::Neoplasm,
            'D' if ["D0", "D1", "D2", "D3", "D4"]
                .iter()
                .any(|block| code.starts_with(block)) =>
            {
                CodeCategory::Neoplasm
            }
            'D' => CodeCategory::Blood,
            'E' => CodeCategory::Endocrine,
            'F' => CodeCategory::Mental,
            'G' => CodeCategory::Nervous,
            'H' if code < "H60" => CodeCategory::Eye,
            'H' => CodeCategory::Ear,
            'I' => CodeCategory::Circulatory,
            'J' => CodeCategory::Respiratory,
            'K' => CodeCategory::Digestive,
            'L' => CodeCategory::Skin,
            'M' => CodeCategory::Musculoskeletal,
            'N' => CodeCategory::Genitourinary,
            'O' => CodeCategory::Obstetric,
            'P' => CodeCategory::Perinatal,
            'Q' => CodeCategory::Congenital,
            'R' => CodeCategory::Symptoms,
            'S' | 'T' => CodeCategory::Injury,
            'V' | 'W' | 'X' | 'Y' => CodeCategory::ExternalCauses,
            'Z' => CodeCategory::HealthFactors,
            _ => CodeCategory::Other,
        }
    }

    /// Stored label for the category
    pub fn label(self) -> &'static str {
        match self {
            CodeCategory::Infectious => "Infectioase",
            CodeCategory::Neoplasm => "Neoplasme",
            CodeCategory::Blood => "Sange",
            CodeCategory::Endocrine => "Endocrin",
            CodeCategory::Mental => "Mental",
            CodeCategory::Nervous => "Nervos",
            CodeCategory::Eye => "Ochi",
            CodeCategory::Ear => "Ureche",
            CodeCategory::Circulatory => "Cardiovascular",
            CodeCategory::Respiratory => "Respirator",
            CodeCategory::Digestive => "Digestiv",
            CodeCategory::Skin => "Piele",
            CodeCategory::Musculoskeletal => "Musculo-scheletic",
            CodeCategory::Genitourinary => "Genito-urinar",
            CodeCategory::Obstetric => "Obstetric",
            CodeCategory::Perinatal => "Perinatal",
            CodeCategory::Congenital => "Malformatii",
            CodeCategory::Symptoms => "Simptome",
            CodeCategory::Injury => "Traumatisme",
            CodeCategory::ExternalCauses => "Cauze externe",
            CodeCategory::HealthFactors => "Factori sanatate",
            CodeCategory::Other => "Alte",
            CodeCategory::Uncategorized => "Necategorizat",
        }
    }
}

impl fmt::Display for CodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
