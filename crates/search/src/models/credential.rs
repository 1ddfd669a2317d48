//! Hosted search API credentials.

use std::fmt;

use serde::Deserialize;

/// One account for the hosted search API.
///
/// Credentials are interchangeable: each has its own daily quota against the
/// same backing search engine configuration.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Credential {
    /// Human-readable label used in logs (e.g. "API-1")
    pub name: String,

    /// API key sent with every request
    pub api_key: String,

    /// Search engine / configuration identifier
    pub engine_id: String,
}

impl Credential {
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        }
    }

    /// Parse a credential from `name|api_key|engine_id`.
    ///
    /// Returns `None` when any part is missing or blank.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split('|').map(str::trim);
        let name = parts.next().filter(|s| !s.is_empty())?;
        let api_key = parts.next().filter(|s| !s.is_empty())?;
        let engine_id = parts.next().filter(|s| !s.is_empty())?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(name, api_key, engine_id))
    }
}

// Keys must never reach the logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("api_key", &"***")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}
