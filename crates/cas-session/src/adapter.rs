//! Bridge between host-framework sessions and the ticket store.
//!
//! The host middleware only ever talks to a [`SessionStoreAdapter`]. Each
//! host session shape implements [`HostSession`], which covers nothing but
//! the translation to and from a [`ServiceTicket`]; host types never reach
//! the store.

use std::marker::PhantomData;

use cas_ticket::{
    Assertion, Attributes, AuthProperties, ClaimEntry, Identity, IdentityTicket, Principal,
    SchemeTicket, ServiceTicket, from_entries, to_entries,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::AdapterConfig;
use crate::error::{Result, StoreError, validate_key};
use crate::store::TicketStore;

/// A host-framework authentication session the adapter can translate.
pub trait HostSession: Sized + Send + Sync {
    /// Scheme (authentication type) that issued the session.
    fn authentication_type(&self) -> Option<&str>;

    fn principal_name(&self) -> Option<&str>;

    /// Assertion carried by a CAS-backed principal.
    fn cas_assertion(&self) -> Option<&Assertion>;

    /// Claims in neutral form, in principal order.
    fn claim_entries(&self) -> Vec<ClaimEntry>;

    fn properties(&self) -> &AuthProperties;

    /// Rebuild a session from a stored ticket found under `key`.
    fn from_service_ticket(key: &str, ticket: ServiceTicket) -> Self;
}

/// Properties for a rebuilt session: the assertion window plus the key.
fn restored_properties(key: &str, assertion: &Assertion) -> AuthProperties {
    let mut properties =
        AuthProperties::new().with_window(assertion.valid_from(), assertion.valid_until());
    properties.set_service_ticket(key);
    properties
}

impl HostSession for SchemeTicket {
    fn authentication_type(&self) -> Option<&str> {
        Some(self.authentication_scheme.as_str())
    }

    fn principal_name(&self) -> Option<&str> {
        self.principal.name()
    }

    fn cas_assertion(&self) -> Option<&Assertion> {
        self.principal.assertion()
    }

    fn claim_entries(&self) -> Vec<ClaimEntry> {
        to_entries(self.principal.claims())
    }

    fn properties(&self) -> &AuthProperties {
        &self.properties
    }

    fn from_service_ticket(key: &str, ticket: ServiceTicket) -> Self {
        let properties = restored_properties(key, ticket.assertion());
        let scheme = ticket.authentication_type().to_string();
        let claims = from_entries(ticket.claims().iter().cloned());
        let principal = Principal::from_assertion(ticket.assertion().clone(), scheme.clone(), claims);
        SchemeTicket::new(principal, properties, scheme)
    }
}

impl HostSession for IdentityTicket {
    fn authentication_type(&self) -> Option<&str> {
        self.identity.authentication_type.as_deref()
    }

    fn principal_name(&self) -> Option<&str> {
        self.identity.name()
    }

    fn cas_assertion(&self) -> Option<&Assertion> {
        self.identity.assertion.as_ref()
    }

    fn claim_entries(&self) -> Vec<ClaimEntry> {
        to_entries(&self.identity.claims)
    }

    fn properties(&self) -> &AuthProperties {
        &self.properties
    }

    fn from_service_ticket(key: &str, ticket: ServiceTicket) -> Self {
        let properties = restored_properties(key, ticket.assertion());
        let claims = from_entries(ticket.claims().iter().cloned());
        let identity = Identity::from_assertion(
            ticket.assertion().clone(),
            ticket.authentication_type(),
            claims,
        );
        IdentityTicket::new(identity, properties)
    }
}

/// Session store extension point for the host middleware.
///
/// Generic over the ticket store backend and the host session shape.
pub struct SessionStoreAdapter<S, H> {
    store: S,
    config: AdapterConfig,
    _host: PhantomData<fn() -> H>,
}

impl<S: TicketStore, H: HostSession> SessionStoreAdapter<S, H> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, AdapterConfig::default())
    }

    pub fn with_config(store: S, config: AdapterConfig) -> Self {
        Self {
            store,
            config,
            _host: PhantomData,
        }
    }

    pub fn ticket_store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Persist a new session and return its key.
    ///
    /// Reuses the ticket id from the `ServiceTicket` property when the
    /// session already carries one, otherwise generates a fresh id.
    pub async fn store(&self, session: &H) -> Result<String> {
        let ticket_id = match session.properties().service_ticket() {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                debug!(ticket_id = %id, "No service ticket on session, generated one");
                id
            }
        };
        let ticket = self.to_service_ticket(ticket_id, session)?;
        self.store.store(ticket).await
    }

    /// Look up a session. `None` means it has been revoked or has expired.
    pub async fn retrieve(&self, key: &str) -> Result<Option<H>> {
        let Some(ticket) = self.store.retrieve(key).await? else {
            debug!(key = %key, "No stored session; treating as revoked");
            return Ok(None);
        };
        Ok(Some(H::from_service_ticket(key, ticket)))
    }

    /// Replace the session stored under `key`.
    pub async fn renew(&self, key: &str, session: &H) -> Result<()> {
        let key = validate_key(key)?;
        let ticket = self.to_service_ticket(key.to_string(), session)?;
        self.store.renew(key, ticket).await
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        self.store.remove(key).await
    }

    /// Revoke the session for a service ticket the CAS server invalidated.
    pub async fn sign_out(&self, ticket_id: &str) -> Result<()> {
        let ticket_id = validate_key(ticket_id)?;
        self.store.remove(ticket_id).await?;
        info!(ticket_id = %ticket_id, "Single sign-out: session revoked");
        Ok(())
    }

    fn to_service_ticket(&self, ticket_id: String, session: &H) -> Result<ServiceTicket> {
        let properties = session.properties();
        let assertion = match session.cas_assertion() {
            Some(assertion) => assertion.clone(),
            None => self.synthesize_assertion(session)?,
        };

        Ok(ServiceTicket::new(
            ticket_id,
            session.authentication_type().unwrap_or_default(),
            assertion,
            session.claim_entries(),
        )?
        .with_issued_utc(properties.issued_utc)
        .with_expires_utc(properties.expires_utc))
    }

    /// Minimal assertion for a principal that CAS did not produce: the
    /// principal name and the session window, no attributes.
    fn synthesize_assertion(&self, session: &H) -> Result<Assertion> {
        let name = session.principal_name().unwrap_or_default();
        if !self.config.synthesize_assertion {
            return Err(StoreError::NotCasBacked(name.to_string()));
        }
        let properties = session.properties();
        debug!(principal = %name, "Synthesizing assertion for non-CAS session");
        Ok(Assertion::with_details(
            name,
            Attributes::new(),
            properties.issued_utc,
            properties.expires_utc,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::memory::{MemoryCache, MemoryTicketStore};
    use cas_ticket::{Claim, ManualClock, NAME_CLAIM_TYPE, SERVICE_TICKET_PROPERTY, TicketError};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn memory_store() -> (MemoryTicketStore, ManualClock) {
        let clock = ManualClock::new(noon());
        let cache = MemoryCache::with_clock(100, Arc::new(clock.clone()));
        (
            MemoryTicketStore::with_cache(cache, &StoreConfig::default()),
            clock,
        )
    }

    fn cas_session(ticket: Option<&str>) -> SchemeTicket {
        let assertion = Assertion::new("alice")
            .unwrap()
            .with_validity(Some(noon()), Some(noon() + Duration::minutes(5)))
            .unwrap();
        let mut properties = AuthProperties::new().with_window(Some(noon()), None);
        if let Some(id) = ticket {
            properties.set_service_ticket(id);
        }
        SchemeTicket::new(
            Principal::from_assertion(
                assertion,
                "CAS",
                vec![Claim::new("role", "admin"), Claim::new("email", "a@x.com")],
            ),
            properties,
            "Cookies",
        )
    }

    fn plain_session() -> SchemeTicket {
        SchemeTicket::new(
            Principal::new(Identity::new(
                "Cookies",
                vec![Claim::new(NAME_CLAIM_TYPE, "bob")],
            )),
            AuthProperties::new().with_window(Some(noon()), Some(noon() + Duration::hours(1))),
            "Cookies",
        )
    }

    #[tokio::test]
    async fn test_store_uses_existing_ticket_id() {
        let (store, _clock) = memory_store();
        let adapter = SessionStoreAdapter::<_, SchemeTicket>::new(store);

        let key = adapter.store(&cas_session(Some("ST-1-abc"))).await.unwrap();
        assert_eq!(key, "ST-1-abc");
    }

    #[tokio::test]
    async fn test_store_generates_ticket_id() {
        let (store, _clock) = memory_store();
        let adapter = SessionStoreAdapter::<_, SchemeTicket>::new(store);

        let key = adapter.store(&cas_session(None)).await.unwrap();
        assert!(Uuid::parse_str(&key).is_ok());

        let other = adapter.store(&cas_session(None)).await.unwrap();
        assert_ne!(key, other);
    }

    #[tokio::test]
    async fn test_retrieve_rebuilds_cas_principal() {
        let (store, _clock) = memory_store();
        let adapter = SessionStoreAdapter::<_, SchemeTicket>::new(store);
        let key = adapter.store(&cas_session(Some("ST-1"))).await.unwrap();

        let session = adapter.retrieve(&key).await.unwrap().unwrap();
        assert_eq!(session.principal.name(), Some("alice"));
        assert_eq!(session.authentication_scheme, "Cookies");
        assert_eq!(session.properties.service_ticket(), Some("ST-1"));
        assert_eq!(session.properties.issued_utc, Some(noon()));
        assert_eq!(
            session.properties.expires_utc,
            Some(noon() + Duration::minutes(5))
        );
        let claims: Vec<_> = session
            .principal
            .claims()
            .map(|c| (c.claim_type.as_str(), c.value.as_str()))
            .collect();
        assert_eq!(claims, vec![("role", "admin"), ("email", "a@x.com")]);
    }

    #[tokio::test]
    async fn test_synthesized_assertion_for_plain_principal() {
        let (store, _clock) = memory_store();
        let adapter = SessionStoreAdapter::<_, SchemeTicket>::new(store);
        let key = adapter.store(&plain_session()).await.unwrap();

        let ticket = adapter.ticket_store().retrieve(&key).await.unwrap().unwrap();
        assert_eq!(ticket.assertion().principal_name(), "bob");
        assert!(ticket.assertion().attributes().is_empty());
        assert_eq!(ticket.assertion().valid_from(), Some(noon()));
        assert_eq!(
            ticket.assertion().valid_until(),
            Some(noon() + Duration::hours(1))
        );
    }

    #[tokio::test]
    async fn test_synthesis_disabled() {
        let (store, _clock) = memory_store();
        let adapter = SessionStoreAdapter::<_, SchemeTicket>::with_config(
            store,
            AdapterConfig::new().with_synthesize_assertion(false),
        );

        let result = adapter.store(&plain_session()).await;
        assert!(matches!(result, Err(StoreError::NotCasBacked(name)) if name == "bob"));

        // CAS-backed sessions are unaffected.
        assert!(adapter.store(&cas_session(None)).await.is_ok());
    }

    #[tokio::test]
    async fn test_nameless_plain_principal_rejected() {
        let (store, _clock) = memory_store();
        let adapter = SessionStoreAdapter::<_, SchemeTicket>::new(store);
        let session = SchemeTicket::new(
            Principal::new(Identity::new("Cookies", vec![])),
            AuthProperties::new(),
            "Cookies",
        );

        let result = adapter.store(&session).await;
        assert!(matches!(
            result,
            Err(StoreError::Ticket(TicketError::EmptyPrincipalName))
        ));
    }

    #[tokio::test]
    async fn test_renew_replaces_session() {
        let (store, _clock) = memory_store();
        let adapter = SessionStoreAdapter::<_, SchemeTicket>::new(store);
        let key = adapter.store(&cas_session(Some("ST-1"))).await.unwrap();

        adapter.renew(&key, &plain_session()).await.unwrap();

        let session = adapter.retrieve(&key).await.unwrap().unwrap();
        assert_eq!(session.principal.name(), Some("bob"));
        assert_eq!(
            adapter
                .ticket_store()
                .retrieve(&key)
                .await
                .unwrap()
                .unwrap()
                .ticket_id(),
            "ST-1"
        );
    }

    #[tokio::test]
    async fn test_sign_out_revokes() {
        let (store, _clock) = memory_store();
        let adapter = SessionStoreAdapter::<_, SchemeTicket>::new(store);
        let key = adapter.store(&cas_session(Some("ST-1"))).await.unwrap();

        adapter.sign_out(&key).await.unwrap();
        assert!(adapter.retrieve(&key).await.unwrap().is_none());

        // Repeated notifications are harmless.
        adapter.sign_out(&key).await.unwrap();
        assert!(matches!(
            adapter.sign_out("").await,
            Err(StoreError::InvalidKey)
        ));
    }

    #[tokio::test]
    async fn test_expired_session_is_revoked() {
        let (store, clock) = memory_store();
        let adapter = SessionStoreAdapter::<_, SchemeTicket>::new(store);
        let key = adapter.store(&cas_session(Some("ST-1"))).await.unwrap();

        clock.advance(Duration::minutes(5));
        assert!(adapter.retrieve(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identity_shape() {
        let (store, _clock) = memory_store();
        let adapter = SessionStoreAdapter::<_, IdentityTicket>::new(store);
        let session = IdentityTicket::new(
            Identity::new("Cookies", vec![Claim::new(NAME_CLAIM_TYPE, "carol")]),
            AuthProperties::new().with_item(SERVICE_TICKET_PROPERTY, "ST-7"),
        );

        let key = adapter.store(&session).await.unwrap();
        assert_eq!(key, "ST-7");

        let restored = adapter.retrieve(&key).await.unwrap().unwrap();
        assert_eq!(restored.identity.name(), Some("carol"));
        assert_eq!(restored.authentication_type(), Some("Cookies"));
        assert!(restored.identity.assertion.is_some());
    }

    #[tokio::test]
    async fn test_empty_keys_rejected() {
        let (store, _clock) = memory_store();
        let adapter = SessionStoreAdapter::<_, SchemeTicket>::new(store);

        assert!(matches!(adapter.retrieve("").await, Err(StoreError::InvalidKey)));
        assert!(matches!(
            adapter.renew("", &cas_session(None)).await,
            Err(StoreError::InvalidKey)
        ));
        assert!(matches!(adapter.remove("").await, Err(StoreError::InvalidKey)));
    }
}
