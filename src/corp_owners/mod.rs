//! Corporate registry module - WA Secretary of State lookups and
//! shell-company chain resolution

pub mod parse;
pub mod registry;
pub mod resolve;
pub mod types;

pub use registry::RegistryClient;
pub use resolve::{
    is_corporate_entity, normalize_entity_name, resolve_beneficial, CorpDirectory,
    ResolveError, MAX_CHAIN_DEPTH,
};
pub use types::{BeneficialOwner, CorpRecord, CorpStatus};
