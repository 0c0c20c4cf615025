//! Remote graph database backend
//!
//! Talks to a Neo4j-compatible server through its HTTP transactional
//! endpoint (`POST {uri}/db/{database}/tx/commit`) with basic auth. Dates are
//! sent as ISO-8601 strings since the wire format has no date type.

pub mod client;
pub mod cypher;
mod store;

pub use client::{CypherClient, RemoteError, RemoteResult};
pub use store::RemoteGraph;
