//! Credential gate for inbound write requests.
//!
//! The legacy write protocol reauthenticates every request through the
//! `u`/`p` query parameters. Credentials are a static shared secret fixed
//! at process start; the gate only compares strings and reports a tagged
//! outcome so the HTTP layer can map it to a status code.

/// Username/password pair the relay accepts writes for.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

/// Outcome of a credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Both credentials matched, the request may proceed.
    Authorized,
    /// The request must be rejected. The reason is for the audit log
    /// only and is never echoed back to the caller.
    Rejected(RejectReason),
}

/// Why a credential check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// `u` or `p` was absent from the query string.
    MissingCredentials,
    /// Supplied values did not match the configured pair.
    Mismatch,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials { username: username.into(), password: password.into() }
    }

    /// The username the relay acknowledges accepted writes with.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Compare caller-supplied values against the configured pair.
    pub fn verify(&self, username: Option<&str>, password: Option<&str>) -> AuthOutcome {
        match (username, password) {
            (Some(u), Some(p)) if u == self.username && p == self.password => {
                AuthOutcome::Authorized
            }
            (Some(_), Some(_)) => AuthOutcome::Rejected(RejectReason::Mismatch),
            _ => AuthOutcome::Rejected(RejectReason::MissingCredentials),
        }
    }
}
