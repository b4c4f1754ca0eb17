//! Statistics tracking for nomenclature imports
//!
//! Counters are bumped as rows are written; the summary wraps them with the
//! outcome of the resolution pass and the elapsed time.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::model::OrphanCode;

/// Rows written during an import, per record kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub chapters: usize,
    pub sections: usize,
    pub codes: usize,
    pub inclusion_terms: usize,
    pub exclusions: usize,
    pub coding_instructions: usize,
    pub notes: usize,
}

impl ImportStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total annotation rows across the four kinds
    pub fn annotations(&self) -> usize {
        self.inclusion_terms + self.exclusions + self.coding_instructions + self.notes
    }

    /// Total rows of every kind
    pub fn total_rows(&self) -> usize {
        self.chapters + self.sections + self.codes + self.annotations()
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} chapters, {} sections, {} codes",
            self.chapters, self.sections, self.codes
        )?;
        if self.annotations() > 0 {
            write!(f, ", {} annotations", self.annotations())?;
        }
        Ok(())
    }
}

/// Outcome of a complete import run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub stats: ImportStats,
    /// `version` attribute of the document root, if any
    pub document_version: Option<String>,
    pub parents_resolved: usize,
    pub orphans: Vec<OrphanCode>,
    /// Integrity violations reported when constraints were restored
    pub constraint_violations: usize,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
}

impl ImportSummary {
    /// Whether every parent link resolved and the store validated cleanly
    pub fn is_consistent(&self) -> bool {
        self.orphans.is_empty() && self.constraint_violations == 0
    }
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nomenclature Import Summary")?;
        writeln!(
            f,
            "  Version:              {}",
            self.document_version.as_deref().unwrap_or("N/A")
        )?;
        writeln!(f, "  Duration:             {:.1} minutes", self.duration.as_secs_f64() / 60.0)?;
        writeln!(f, "  Chapters:             {}", self.stats.chapters)?;
        writeln!(f, "  Sections:             {}", self.stats.sections)?;
        writeln!(f, "  Codes:                {}", self.stats.codes)?;
        writeln!(f, "  Inclusion terms:      {}", self.stats.inclusion_terms)?;
        writeln!(f, "  Exclusions:           {}", self.stats.exclusions)?;
        writeln!(f, "  Coding instructions:  {}", self.stats.coding_instructions)?;
        writeln!(f, "  Notes:                {}", self.stats.notes)?;
        writeln!(f, "  Parent links:         {}", self.parents_resolved)?;
        if !self.orphans.is_empty() {
            writeln!(f, "  Orphaned codes:       {}", self.orphans.len())?;
        }
        if self.constraint_violations > 0 {
            writeln!(f, "  Constraint violations: {}", self.constraint_violations)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> ImportStats {
        ImportStats {
            chapters: 1,
            sections: 2,
            codes: 10,
            inclusion_terms: 3,
            exclusions: 2,
            coding_instructions: 1,
            notes: 4,
        }
    }

    #[test]
    fn test_stats_totals() {
        let stats = sample_stats();
        assert_eq!(stats.annotations(), 10);
        assert_eq!(stats.total_rows(), 23);
        assert_eq!(ImportStats::new().total_rows(), 0);
    }

    #[test]
    fn test_stats_display() {
        insta::assert_snapshot!(sample_stats(), @"1 chapters, 2 sections, 10 codes, 10 annotations");
        insta::assert_snapshot!(ImportStats::new(), @"0 chapters, 0 sections, 0 codes");
    }

    #[test]
    fn test_summary_display() {
        let summary = ImportSummary {
            stats: sample_stats(),
            document_version: Some("2026".to_string()),
            parents_resolved: 8,
            orphans: vec![OrphanCode {
                code: "B01.1".to_string(),
                parent_code: "B01".to_string(),
            }],
            constraint_violations: 0,
            duration: Duration::from_secs(90),
        };

        assert!(!summary.is_consistent());

        let display = summary.to_string();
        assert!(display.contains("Version:              2026"));
        assert!(display.contains("Duration:             1.5 minutes"));
        assert!(display.contains("Codes:                10"));
        assert!(display.contains("Parent links:         8"));
        assert!(display.contains("Orphaned codes:       1"));
        assert!(!display.contains("Constraint violations"));
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = ImportSummary {
            stats: sample_stats(),
            document_version: None,
            parents_resolved: 9,
            orphans: vec![],
            constraint_violations: 0,
            duration: Duration::from_millis(1500),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["stats"]["inclusionTerms"], 3);
        assert_eq!(json["parentsResolved"], 9);
        assert_eq!(json["duration"], 1.5);
        assert!(json["documentVersion"].is_null());
    }
}
