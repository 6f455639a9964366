//! Claims and their framework-neutral representation.
//!
//! A host framework's [`Claim`] can carry live, non-portable state (its
//! property bag). [`ClaimEntry`] keeps only the five fields that survive a
//! trip through a cache.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value type used when a claim is created from a bare string value.
pub const CLAIM_VALUE_TYPE_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Issuer used when a claim is created without one.
pub const DEFAULT_ISSUER: &str = "LOCAL AUTHORITY";

/// Claim type carrying the principal's name.
pub const NAME_CLAIM_TYPE: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";

/// Claim type carrying a role.
pub const ROLE_CLAIM_TYPE: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";

/// A typed statement about a principal, as the host framework holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
    pub value_type: String,
    pub issuer: String,
    pub original_issuer: String,
    /// Host-side annotations. Not portable; dropped by [`ClaimEntry`].
    pub properties: BTreeMap<String, String>,
}

impl Claim {
    /// Create a string-valued claim issued by [`DEFAULT_ISSUER`].
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            value_type: CLAIM_VALUE_TYPE_STRING.to_string(),
            issuer: DEFAULT_ISSUER.to_string(),
            original_issuer: DEFAULT_ISSUER.to_string(),
            properties: BTreeMap::new(),
        }
    }

    /// Set the issuer; the original issuer follows unless set separately.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self.original_issuer = self.issuer.clone();
        self
    }

    pub fn with_original_issuer(mut self, original_issuer: impl Into<String>) -> Self {
        self.original_issuer = original_issuer.into();
        self
    }

    pub fn with_value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = value_type.into();
        self
    }
}

/// Serialization-neutral claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimEntry {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
    pub value_type: String,
    pub issuer: String,
    pub original_issuer: String,
}

impl ClaimEntry {
    /// Create a string-valued entry issued by [`DEFAULT_ISSUER`].
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Claim::new(claim_type, value).into()
    }
}

impl From<&Claim> for ClaimEntry {
    fn from(claim: &Claim) -> Self {
        Self {
            claim_type: claim.claim_type.clone(),
            value: claim.value.clone(),
            value_type: claim.value_type.clone(),
            issuer: claim.issuer.clone(),
            original_issuer: claim.original_issuer.clone(),
        }
    }
}

impl From<Claim> for ClaimEntry {
    fn from(claim: Claim) -> Self {
        Self {
            claim_type: claim.claim_type,
            value: claim.value,
            value_type: claim.value_type,
            issuer: claim.issuer,
            original_issuer: claim.original_issuer,
        }
    }
}

impl From<ClaimEntry> for Claim {
    fn from(entry: ClaimEntry) -> Self {
        Self {
            claim_type: entry.claim_type,
            value: entry.value,
            value_type: entry.value_type,
            issuer: entry.issuer,
            original_issuer: entry.original_issuer,
            properties: BTreeMap::new(),
        }
    }
}

/// Flatten a claim collection into entries, preserving order.
pub fn to_entries<'a>(claims: impl IntoIterator<Item = &'a Claim>) -> Vec<ClaimEntry> {
    claims.into_iter().map(ClaimEntry::from).collect()
}

/// Rebuild host claims from entries, preserving order.
pub fn from_entries(entries: impl IntoIterator<Item = ClaimEntry>) -> Vec<Claim> {
    entries.into_iter().map(Claim::from).collect()
}
