//! Proof utilities: canonical serialization and content hashing.
//!
//! Every artifact the workspace persists (solution plans, search traces,
//! run reports, configuration snapshots) is serialized through
//! [`canon::canonical_json_bytes`] and addressed by
//! [`hash::canonical_hash`] under a [`hash_domain::HashDomain`].

pub mod canon;
pub mod hash;
pub mod hash_domain;
