//! Serializable stand-ins for the model and host session types.
//!
//! Holders hold only plain data. Live host objects (identities, principals)
//! are reduced to their portable parts on the way in and rebuilt on the way
//! out. Every timestamp is written with an explicit offset and normalised to
//! UTC when read back.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::assertion::{Assertion, Attributes};
use crate::claims::{self, ClaimEntry};
use crate::error::TicketError;
use crate::host::{AuthProperties, Identity, IdentityTicket, Principal, SchemeTicket};
use crate::ticket::ServiceTicket;

/// A value with a serializable holder form.
pub trait Portable: Sized {
    type Holder: Serialize + DeserializeOwned;

    fn to_holder(&self) -> Self::Holder;

    /// Rebuild the value, re-checking every construction invariant.
    fn from_holder(holder: Self::Holder) -> Result<Self, TicketError>;
}

fn to_offset(ts: Option<DateTime<Utc>>) -> Option<DateTime<FixedOffset>> {
    ts.map(|t| t.fixed_offset())
}

fn to_utc(ts: Option<DateTime<FixedOffset>>) -> Option<DateTime<Utc>> {
    ts.map(|t| t.with_timezone(&Utc))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionHolder {
    pub principal_name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<FixedOffset>>,
}

impl Portable for Assertion {
    type Holder = AssertionHolder;

    fn to_holder(&self) -> AssertionHolder {
        AssertionHolder {
            principal_name: self.principal_name().to_string(),
            attributes: self.attributes().clone(),
            valid_from: to_offset(self.valid_from()),
            valid_until: to_offset(self.valid_until()),
        }
    }

    fn from_holder(holder: AssertionHolder) -> Result<Self, TicketError> {
        let attributes: Attributes = holder.attributes;
        Assertion::with_details(
            holder.principal_name,
            attributes,
            to_utc(holder.valid_from),
            to_utc(holder.valid_until),
        )
    }
}

/// Persisted layout of a service ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTicketHolder {
    pub ticket_id: String,
    pub authentication_type: String,
    pub assertion: AssertionHolder,
    #[serde(default)]
    pub claims: Vec<ClaimEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_utc: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_utc: Option<DateTime<FixedOffset>>,
}

impl Portable for ServiceTicket {
    type Holder = ServiceTicketHolder;

    fn to_holder(&self) -> ServiceTicketHolder {
        ServiceTicketHolder {
            ticket_id: self.ticket_id().to_string(),
            authentication_type: self.authentication_type().to_string(),
            assertion: self.assertion().to_holder(),
            claims: self.claims().to_vec(),
            issued_utc: to_offset(self.issued_utc()),
            expires_utc: to_offset(self.expires_utc()),
        }
    }

    fn from_holder(holder: ServiceTicketHolder) -> Result<Self, TicketError> {
        let assertion = Assertion::from_holder(holder.assertion)?;
        Ok(ServiceTicket::new(
            holder.ticket_id,
            holder.authentication_type,
            assertion,
            holder.claims,
        )?
        .with_issued_utc(to_utc(holder.issued_utc))
        .with_expires_utc(to_utc(holder.expires_utc)))
    }
}

/// Portable parts of an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityHolder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<String>,
    #[serde(default)]
    pub claims: Vec<ClaimEntry>,
    pub name_claim_type: String,
    pub role_claim_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<AssertionHolder>,
}

impl Portable for Identity {
    type Holder = IdentityHolder;

    fn to_holder(&self) -> IdentityHolder {
        IdentityHolder {
            authentication_type: self.authentication_type.clone(),
            claims: claims::to_entries(&self.claims),
            name_claim_type: self.name_claim_type.clone(),
            role_claim_type: self.role_claim_type.clone(),
            assertion: self.assertion.as_ref().map(Portable::to_holder),
        }
    }

    fn from_holder(holder: IdentityHolder) -> Result<Self, TicketError> {
        Ok(Identity {
            authentication_type: holder.authentication_type,
            claims: claims::from_entries(holder.claims),
            name_claim_type: holder.name_claim_type,
            role_claim_type: holder.role_claim_type,
            assertion: holder.assertion.map(Assertion::from_holder).transpose()?,
        })
    }
}

/// Property bag with its window pulled out. Unknown items pass through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertiesHolder {
    #[serde(default)]
    pub items: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_utc: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_utc: Option<DateTime<FixedOffset>>,
}

impl Portable for AuthProperties {
    type Holder = PropertiesHolder;

    fn to_holder(&self) -> PropertiesHolder {
        PropertiesHolder {
            items: self.items.clone(),
            issued_utc: to_offset(self.issued_utc),
            expires_utc: to_offset(self.expires_utc),
        }
    }

    fn from_holder(holder: PropertiesHolder) -> Result<Self, TicketError> {
        Ok(AuthProperties {
            items: holder.items,
            issued_utc: to_utc(holder.issued_utc),
            expires_utc: to_utc(holder.expires_utc),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeTicketHolder {
    pub authentication_scheme: String,
    pub identities: Vec<IdentityHolder>,
    #[serde(default)]
    pub properties: PropertiesHolder,
}

impl Portable for SchemeTicket {
    type Holder = SchemeTicketHolder;

    fn to_holder(&self) -> SchemeTicketHolder {
        SchemeTicketHolder {
            authentication_scheme: self.authentication_scheme.clone(),
            identities: self
                .principal
                .identities
                .iter()
                .map(Portable::to_holder)
                .collect(),
            properties: self.properties.to_holder(),
        }
    }

    fn from_holder(holder: SchemeTicketHolder) -> Result<Self, TicketError> {
        if holder.authentication_scheme.is_empty() {
            return Err(TicketError::EmptyAuthenticationType);
        }
        let identities = holder
            .identities
            .into_iter()
            .map(Identity::from_holder)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SchemeTicket {
            authentication_scheme: holder.authentication_scheme,
            principal: Principal { identities },
            properties: AuthProperties::from_holder(holder.properties)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityTicketHolder {
    pub identity: IdentityHolder,
    #[serde(default)]
    pub properties: PropertiesHolder,
}

impl Portable for IdentityTicket {
    type Holder = IdentityTicketHolder;

    fn to_holder(&self) -> IdentityTicketHolder {
        IdentityTicketHolder {
            identity: self.identity.to_holder(),
            properties: self.properties.to_holder(),
        }
    }

    fn from_holder(holder: IdentityTicketHolder) -> Result<Self, TicketError> {
        Ok(IdentityTicket {
            identity: Identity::from_holder(holder.identity)?,
            properties: AuthProperties::from_holder(holder.properties)?,
        })
    }
}
