//! Host-framework authentication session shapes.
//!
//! Two middleware pipelines hand sessions to the store in different shapes:
//! [`SchemeTicket`] names the scheme separately from a multi-identity
//! [`Principal`], while [`IdentityTicket`] wraps a single [`Identity`] whose
//! authentication type doubles as the scheme. Both carry an
//! [`AuthProperties`] bag that the store passes through untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::assertion::Assertion;
use crate::claims::{Claim, NAME_CLAIM_TYPE, ROLE_CLAIM_TYPE};

/// Property-bag key carrying the service ticket id across a sign-in.
pub const SERVICE_TICKET_PROPERTY: &str = "ServiceTicket";

/// An authenticated identity: a scheme name and the claims it established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub authentication_type: Option<String>,
    pub claims: Vec<Claim>,
    pub name_claim_type: String,
    pub role_claim_type: String,
    /// Assertion this identity was built from, when CAS issued it.
    pub assertion: Option<Assertion>,
}

impl Identity {
    /// Create an identity using the standard name and role claim types.
    pub fn new(authentication_type: impl Into<String>, claims: Vec<Claim>) -> Self {
        Self {
            authentication_type: Some(authentication_type.into()),
            claims,
            name_claim_type: NAME_CLAIM_TYPE.to_string(),
            role_claim_type: ROLE_CLAIM_TYPE.to_string(),
            assertion: None,
        }
    }

    /// Identity established by CAS: carries the assertion alongside the claims.
    pub fn from_assertion(
        assertion: Assertion,
        authentication_type: impl Into<String>,
        claims: Vec<Claim>,
    ) -> Self {
        Self {
            assertion: Some(assertion),
            ..Self::new(authentication_type, claims)
        }
    }

    pub fn with_claim_types(
        mut self,
        name_claim_type: impl Into<String>,
        role_claim_type: impl Into<String>,
    ) -> Self {
        self.name_claim_type = name_claim_type.into();
        self.role_claim_type = role_claim_type.into();
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication_type
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// The principal name: the assertion's when CAS-backed, else the first
    /// claim of `name_claim_type`.
    pub fn name(&self) -> Option<&str> {
        if let Some(assertion) = &self.assertion {
            return Some(assertion.principal_name());
        }
        self.claims
            .iter()
            .find(|c| c.claim_type == self.name_claim_type)
            .map(|c| c.value.as_str())
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.claims
            .iter()
            .filter(|c| c.claim_type == self.role_claim_type)
            .map(|c| c.value.as_str())
    }
}

/// One or more identities presented by the same user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub identities: Vec<Identity>,
}

impl Principal {
    pub fn new(identity: Identity) -> Self {
        Self {
            identities: vec![identity],
        }
    }

    /// Principal built from a CAS validation result.
    pub fn from_assertion(
        assertion: Assertion,
        authentication_type: impl Into<String>,
        claims: Vec<Claim>,
    ) -> Self {
        Self::new(Identity::from_assertion(
            assertion,
            authentication_type,
            claims,
        ))
    }

    /// The identity consulted for name and assertion.
    pub fn primary_identity(&self) -> Option<&Identity> {
        self.identities
            .iter()
            .find(|i| i.assertion.is_some())
            .or_else(|| self.identities.first())
    }

    pub fn name(&self) -> Option<&str> {
        self.primary_identity().and_then(Identity::name)
    }

    /// The CAS assertion, if this principal came from a CAS validation.
    pub fn assertion(&self) -> Option<&Assertion> {
        self.identities.iter().find_map(|i| i.assertion.as_ref())
    }

    /// Claims across all identities, in identity order.
    pub fn claims(&self) -> impl Iterator<Item = &Claim> {
        self.identities.iter().flat_map(|i| i.claims.iter())
    }
}

/// Session property bag.
///
/// `items` is opaque to the store: entries it does not recognise survive
/// every encode/decode round trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthProperties {
    pub items: BTreeMap<String, String>,
    pub issued_utc: Option<DateTime<Utc>>,
    pub expires_utc: Option<DateTime<Utc>>,
}

impl AuthProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(
        mut self,
        issued_utc: Option<DateTime<Utc>>,
        expires_utc: Option<DateTime<Utc>>,
    ) -> Self {
        self.issued_utc = issued_utc;
        self.expires_utc = expires_utc;
        self
    }

    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.insert(key.into(), value.into());
        self
    }

    /// Ticket id assigned on an earlier store, if any.
    pub fn service_ticket(&self) -> Option<&str> {
        self.items
            .get(SERVICE_TICKET_PROPERTY)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn set_service_ticket(&mut self, ticket_id: impl Into<String>) {
        self.items
            .insert(SERVICE_TICKET_PROPERTY.to_string(), ticket_id.into());
    }
}

/// Scheme-oriented session: a named scheme plus a multi-identity principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeTicket {
    pub authentication_scheme: String,
    pub principal: Principal,
    pub properties: AuthProperties,
}

impl SchemeTicket {
    pub fn new(
        principal: Principal,
        properties: AuthProperties,
        authentication_scheme: impl Into<String>,
    ) -> Self {
        Self {
            authentication_scheme: authentication_scheme.into(),
            principal,
            properties,
        }
    }
}

/// Identity-oriented session: one identity whose type names the scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityTicket {
    pub identity: Identity,
    pub properties: AuthProperties,
}

impl IdentityTicket {
    pub fn new(identity: Identity, properties: AuthProperties) -> Self {
        Self {
            identity,
            properties,
        }
    }

    pub fn authentication_type(&self) -> Option<&str> {
        self.identity.authentication_type.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_name_from_claims() {
        let identity = Identity::new(
            "Cookies",
            vec![
                Claim::new(ROLE_CLAIM_TYPE, "admin"),
                Claim::new(NAME_CLAIM_TYPE, "bob"),
            ],
        );
        assert_eq!(identity.name(), Some("bob"));
        assert_eq!(identity.roles().collect::<Vec<_>>(), vec!["admin"]);
    }

    #[test]
    fn test_assertion_name_wins() {
        let identity = Identity::from_assertion(
            Assertion::new("alice").unwrap(),
            "CAS",
            vec![Claim::new(NAME_CLAIM_TYPE, "someone-else")],
        );
        assert_eq!(identity.name(), Some("alice"));
    }

    #[test]
    fn test_principal_prefers_cas_identity() {
        let principal = Principal {
            identities: vec![
                Identity::new("Cookies", vec![Claim::new(NAME_CLAIM_TYPE, "local")]),
                Identity::from_assertion(Assertion::new("alice").unwrap(), "CAS", vec![]),
            ],
        };
        assert_eq!(principal.name(), Some("alice"));
        assert!(principal.assertion().is_some());
    }

    #[test]
    fn test_service_ticket_property() {
        let mut properties = AuthProperties::new();
        assert_eq!(properties.service_ticket(), None);

        properties.set_service_ticket("");
        assert_eq!(properties.service_ticket(), None);

        properties.set_service_ticket("ST-42");
        assert_eq!(properties.service_ticket(), Some("ST-42"));
        assert_eq!(
            properties.items.get(SERVICE_TICKET_PROPERTY).map(String::as_str),
            Some("ST-42")
        );
    }

    #[test]
    fn test_unauthenticated_identity() {
        let mut identity = Identity::new("", vec![]);
        assert!(!identity.is_authenticated());
        identity.authentication_type = None;
        assert!(!identity.is_authenticated());
    }
}
