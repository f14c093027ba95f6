//! Credential checking for inbound requests.

pub mod credential_gate;

pub use credential_gate::{AuthOutcome, Credentials, RejectReason};
