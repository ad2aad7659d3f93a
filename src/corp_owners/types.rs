//! Corporate registry data types
//! Pure data structures with no behavior

use serde::{Deserialize, Serialize};

/// Registration status as reported by the Secretary of State
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorpStatus {
    Active,
    Dissolved,
    Inactive,
    Unknown,
}

impl CorpStatus {
    pub fn parse(raw: &str) -> CorpStatus {
        let lower = raw.trim().to_lowercase();
        if lower.starts_with("active") {
            CorpStatus::Active
        } else if lower.contains("dissolv") || lower.contains("terminat") {
            CorpStatus::Dissolved
        } else if lower.contains("inactive") || lower.contains("delinquent") {
            CorpStatus::Inactive
        } else {
            CorpStatus::Unknown
        }
    }
}

impl std::fmt::Display for CorpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpStatus::Active => write!(f, "active"),
            CorpStatus::Dissolved => write!(f, "dissolved"),
            CorpStatus::Inactive => write!(f, "inactive"),
            CorpStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// One Secretary of State registration
/// UBI = Unified Business Identifier, 9 digits
#[derive(Debug, Clone)]
pub struct CorpRecord {
    pub ubi: String,
    pub name: String,
    pub status: CorpStatus,
    pub registered_agent: Option<String>,
    pub governors: Vec<String>,
}

/// Result of following an ownership chain to its end
#[derive(Debug, Clone, PartialEq)]
pub struct BeneficialOwner {
    pub name: String,
    /// Entities traversed to reach the owner, in traversal order
    pub chain: Vec<String>,
    pub depth: u32,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(CorpStatus::parse("ACTIVE"), CorpStatus::Active);
        assert_eq!(CorpStatus::parse("Active/Compliance Hold"), CorpStatus::Active);
        assert_eq!(CorpStatus::parse("Administratively Dissolved"), CorpStatus::Dissolved);
        assert_eq!(CorpStatus::parse("Inactive"), CorpStatus::Inactive);
        assert_eq!(CorpStatus::parse("Delinquent"), CorpStatus::Inactive);
        assert_eq!(CorpStatus::parse("???"), CorpStatus::Unknown);
    }
}
