//! Chain resolution - follow corporate entities to a beneficial owner

use crate::corp_owners::types::{BeneficialOwner, CorpRecord};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Hop limit when following governor links
pub const MAX_CHAIN_DEPTH: u32 = 8;

/// Confidence decay applied per hop in the chain
const HOP_DECAY: f32 = 0.85;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("ownership cycle detected at {0}")]
    CycleDetected(String),
    #[error("ownership chain exceeded {0} hops")]
    DepthExceeded(u32),
}

/// In-memory registry directory, keyed by normalized entity name
#[derive(Debug, Default)]
pub struct CorpDirectory {
    by_name: HashMap<String, CorpRecord>,
}

impl CorpDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<CorpRecord>) -> Self {
        let mut dir = Self::new();
        for record in records {
            dir.insert(record);
        }
        dir
    }

    pub fn insert(&mut self, record: CorpRecord) {
        self.by_name.insert(normalize_entity_name(&record.name), record);
    }

    /// Lookup by raw name (normalized internally)
    pub fn get(&self, name: &str) -> Option<&CorpRecord> {
        self.by_name.get(&normalize_entity_name(name))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Normalize an entity name for matching: uppercase, punctuation stripped,
/// whitespace collapsed. "Pine St. Holdings, L.L.C." and
/// "PINE ST HOLDINGS LLC" normalize identically.
pub fn normalize_entity_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_space = true;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
            last_was_space = false;
        } else if matches!(ch, '.' | ',' | '\'') {
            // dropped outright so "L.L.C." collapses to "LLC"
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }

    out.trim_end().to_string()
}

const ENTITY_SUFFIXES: &[&str] = &[
    "LLC", "PLLC", "INC", "CORP", "CORPORATION", "LP", "LLP", "LTD", "COMPANY",
];

/// Does this name look like a registered corporate entity?
/// Suffix check over the normalized form.
pub fn is_corporate_entity(name: &str) -> bool {
    let normalized = normalize_entity_name(name);
    match normalized.rsplit(' ').next() {
        Some(last) => ENTITY_SUFFIXES.contains(&last),
        None => false,
    }
}

/// Follow governor/agent links until the holder is no longer a corporate
/// entity present in the directory.
///
/// A non-entity name resolves to itself at depth 0, confidence 1.0.
/// Confidence decays multiplicatively per hop. When a record lists several
/// governors, the first one (registry ordering) is followed.
pub fn resolve_beneficial(
    owner_name: &str,
    directory: &CorpDirectory,
) -> Result<BeneficialOwner, ResolveError> {
    let mut current = owner_name.trim().to_string();
    let mut chain = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut depth = 0u32;
    let mut confidence = 1.0f32;

    loop {
        if !is_corporate_entity(&current) {
            break;
        }

        let key = normalize_entity_name(&current);
        if !visited.insert(key) {
            return Err(ResolveError::CycleDetected(current));
        }

        let record = match directory.get(&current) {
            Some(record) => record,
            // entity not in the registry - chain ends at the entity itself
            None => break,
        };

        let next = record
            .governors
            .first()
            .or(record.registered_agent.as_ref());

        let next = match next {
            Some(next) => next.clone(),
            // no governors and no agent - terminal entity
            None => break,
        };

        depth += 1;
        if depth > MAX_CHAIN_DEPTH {
            return Err(ResolveError::DepthExceeded(MAX_CHAIN_DEPTH));
        }

        debug!("Chain hop {}: {} -> {}", depth, current, next);
        chain.push(current);
        current = next;
        confidence *= HOP_DECAY;
    }

    Ok(BeneficialOwner {
        name: current,
        chain,
        depth,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corp_owners::types::CorpStatus;

    fn record(ubi: &str, name: &str, governors: Vec<&str>) -> CorpRecord {
        CorpRecord {
            ubi: ubi.to_string(),
            name: name.to_string(),
            status: CorpStatus::Active,
            registered_agent: None,
            governors: governors.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_normalize_entity_name() {
        assert_eq!(
            normalize_entity_name("Pine St. Holdings, L.L.C."),
            "PINE ST HOLDINGS LLC"
        );
        assert_eq!(
            normalize_entity_name("  ACME   PROPERTIES  LLC "),
            "ACME PROPERTIES LLC"
        );
        assert_eq!(normalize_entity_name(""), "");
    }

    #[test]
    fn test_is_corporate_entity() {
        assert!(is_corporate_entity("ACME PROPERTIES LLC"));
        assert!(is_corporate_entity("Evergreen Towers Inc."));
        assert!(is_corporate_entity("4th & Pike Corp"));
        assert!(!is_corporate_entity("JANE DOE"));
        assert!(!is_corporate_entity("SMITH FAMILY TRUST"));
        assert!(!is_corporate_entity(""));
    }

    #[test]
    fn test_resolve_individual_is_identity() {
        let dir = CorpDirectory::new();
        let owner = resolve_beneficial("JANE DOE", &dir).unwrap();

        assert_eq!(owner.name, "JANE DOE");
        assert_eq!(owner.depth, 0);
        assert!(owner.chain.is_empty());
        assert_eq!(owner.confidence, 1.0);
    }

    #[test]
    fn test_resolve_single_hop() {
        let dir = CorpDirectory::from_records(vec![record(
            "601234567",
            "ACME PROPERTIES LLC",
            vec!["JANE DOE"],
        )]);

        let owner = resolve_beneficial("ACME PROPERTIES LLC", &dir).unwrap();

        assert_eq!(owner.name, "JANE DOE");
        assert_eq!(owner.depth, 1);
        assert_eq!(owner.chain, vec!["ACME PROPERTIES LLC"]);
        assert!((owner.confidence - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_shell_chain() {
        let dir = CorpDirectory::from_records(vec![
            record("601111111", "ACME PROPERTIES LLC", vec!["HOLDCO TWO LLC"]),
            record("602222222", "HOLDCO TWO LLC", vec!["JOHN ROE"]),
        ]);

        let owner = resolve_beneficial("ACME PROPERTIES LLC", &dir).unwrap();

        assert_eq!(owner.name, "JOHN ROE");
        assert_eq!(owner.depth, 2);
        assert_eq!(
            owner.chain,
            vec!["ACME PROPERTIES LLC", "HOLDCO TWO LLC"]
        );
        assert!((owner.confidence - 0.85 * 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_unknown_entity_terminates() {
        let dir = CorpDirectory::new();
        let owner = resolve_beneficial("MYSTERY HOLDINGS LLC", &dir).unwrap();

        // not in the registry - the entity itself is the best answer
        assert_eq!(owner.name, "MYSTERY HOLDINGS LLC");
        assert_eq!(owner.depth, 0);
    }

    #[test]
    fn test_resolve_detects_cycle() {
        let dir = CorpDirectory::from_records(vec![
            record("601111111", "ALPHA LLC", vec!["BETA LLC"]),
            record("602222222", "BETA LLC", vec!["ALPHA LLC"]),
        ]);

        let err = resolve_beneficial("ALPHA LLC", &dir).unwrap_err();
        assert!(matches!(err, ResolveError::CycleDetected(_)));
    }

    #[test]
    fn test_resolve_depth_limit() {
        // a chain that renames at every hop, longer than the limit
        let records: Vec<CorpRecord> = (0..20)
            .map(|i| CorpRecord {
                ubi: format!("60{:07}", i),
                name: format!("SHELL {} LLC", i),
                status: CorpStatus::Active,
                registered_agent: None,
                governors: vec![format!("SHELL {} LLC", i + 1)],
            })
            .collect();
        let dir = CorpDirectory::from_records(records);

        let err = resolve_beneficial("SHELL 0 LLC", &dir).unwrap_err();
        assert!(matches!(err, ResolveError::DepthExceeded(_)));
    }

    #[test]
    fn test_resolve_falls_back_to_agent() {
        let mut rec = record("601234567", "QUIET HOLDINGS LLC", vec![]);
        rec.registered_agent = Some("MARY MAJOR".to_string());
        let dir = CorpDirectory::from_records(vec![rec]);

        let owner = resolve_beneficial("QUIET HOLDINGS LLC", &dir).unwrap();
        assert_eq!(owner.name, "MARY MAJOR");
        assert_eq!(owner.depth, 1);
    }
}
