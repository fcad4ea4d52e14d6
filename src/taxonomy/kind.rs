use serde::Serialize;

use super::error::{Result, TaxonomyError};

/// Taxonomy level of a node. The set is closed; the corpus declares it through
/// the `StandardHierarchyLevel` description of each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    SubjectGrade,
    StandardType,
    Domain,
    Cluster,
    Standard,
    Component,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::SubjectGrade,
        Kind::StandardType,
        Kind::Domain,
        Kind::Cluster,
        Kind::Standard,
        Kind::Component,
    ];

    /// Classifies a declared level string. Matching ignores case and treats
    /// spaces, hyphens and underscores alike.
    pub fn classify(level: &str) -> Result<Kind> {
        let normalized = level
            .trim()
            .to_ascii_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ");

        match normalized.as_str() {
            "grade" | "subject grade" | "grade level" => Ok(Kind::SubjectGrade),
            "standard type" | "strand" => Ok(Kind::StandardType),
            "domain" => Ok(Kind::Domain),
            "cluster" => Ok(Kind::Cluster),
            "standard" => Ok(Kind::Standard),
            "component" | "standard component" => Ok(Kind::Component),
            _ => Err(TaxonomyError::UnknownKind(level.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::SubjectGrade => "subject_grade",
            Kind::StandardType => "standard_type",
            Kind::Domain => "domain",
            Kind::Cluster => "cluster",
            Kind::Standard => "standard",
            Kind::Component => "component",
        }
    }

    /// Kinds a linked parent may have. An empty slice marks a root kind.
    pub fn allowed_parents(self) -> &'static [Kind] {
        match self {
            Kind::SubjectGrade => &[],
            Kind::StandardType => &[Kind::SubjectGrade],
            Kind::Domain => &[Kind::SubjectGrade, Kind::StandardType],
            Kind::Cluster => &[Kind::Domain],
            Kind::Standard => &[Kind::Cluster, Kind::Domain],
            Kind::Component => &[Kind::Standard],
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
