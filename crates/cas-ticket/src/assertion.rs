//! The identity a CAS server vouched for.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{Result, TicketError};

/// Multi-valued attribute map released by the CAS server.
pub type Attributes = BTreeMap<String, Vec<String>>;

/// Immutable record of what the CAS server asserted about a principal.
///
/// Produced by the ticket-validation client and owned by whichever
/// [`ServiceTicket`](crate::ServiceTicket) embeds it. Construction enforces a
/// non-empty principal name and `valid_from <= valid_until`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    principal_name: String,
    attributes: Attributes,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
}

impl Assertion {
    /// Create an assertion with no attributes and an open validity window.
    pub fn new(principal_name: impl Into<String>) -> Result<Self> {
        Self::with_details(principal_name, Attributes::new(), None, None)
    }

    /// Create a fully specified assertion.
    pub fn with_details(
        principal_name: impl Into<String>,
        attributes: Attributes,
        valid_from: Option<DateTime<Utc>>,
        valid_until: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let principal_name = principal_name.into();
        if principal_name.is_empty() {
            return Err(TicketError::EmptyPrincipalName);
        }
        if let (Some(from), Some(until)) = (valid_from, valid_until) {
            if from > until {
                return Err(TicketError::InvalidValidityWindow {
                    valid_from: from.to_rfc3339(),
                    valid_until: until.to_rfc3339(),
                });
            }
        }
        Ok(Self {
            principal_name,
            attributes,
            valid_from,
            valid_until,
        })
    }

    /// Replace the attribute map.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Replace the validity window, re-checking its ordering.
    pub fn with_validity(
        self,
        valid_from: Option<DateTime<Utc>>,
        valid_until: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        Self::with_details(self.principal_name, self.attributes, valid_from, valid_until)
    }

    /// The authenticated principal's name.
    pub fn principal_name(&self) -> &str {
        &self.principal_name
    }

    /// All released attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// First value of an attribute, if released.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value of an attribute (empty when not released).
    pub fn attribute_values(&self, name: &str) -> &[String] {
        self.attributes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn valid_from(&self) -> Option<DateTime<Utc>> {
        self.valid_from
    }

    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.valid_until
    }

    /// Whether `now` falls inside the validity window. Missing bounds are open.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_from.is_none_or(|from| now >= from)
            && self.valid_until.is_none_or(|until| now < until)
    }
}
