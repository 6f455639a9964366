//! Byte encoding for [`Portable`] values.
//!
//! JSON is used on the wire. Decoding either yields a fully valid value or a
//! [`CodecError`]; a payload is never coerced into a partially populated one.

use crate::error::CodecError;
use crate::holder::Portable;

/// Encode a value through its holder.
pub fn encode<T: Portable>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(&value.to_holder()).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decode a value from bytes produced by [`encode`].
pub fn decode<T: Portable>(bytes: &[u8]) -> Result<T, CodecError> {
    let holder: T::Holder =
        serde_json::from_slice(bytes).map_err(|e| CodecError::Deserialization(e.to_string()))?;
    Ok(T::from_holder(holder)?)
}

/// Encode to a UTF-8 string, for text-oriented caches.
pub fn encode_to_string<T: Portable>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(&value.to_holder()).map_err(|e| CodecError::Serialization(e.to_string()))
}

pub fn decode_from_str<T: Portable>(text: &str) -> Result<T, CodecError> {
    decode(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::{Assertion, Attributes};
    use crate::claims::{Claim, ClaimEntry, NAME_CLAIM_TYPE};
    use crate::host::{
        AuthProperties, Identity, IdentityTicket, Principal, SchemeTicket, SERVICE_TICKET_PROPERTY,
    };
    use crate::ticket::ServiceTicket;
    use chrono::{Duration, TimeZone, Utc};

    fn sample_ticket() -> ServiceTicket {
        let noon = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut attributes = Attributes::new();
        attributes.insert(
            "memberOf".to_string(),
            vec!["staff".to_string(), "admins".to_string()],
        );
        let assertion = Assertion::with_details(
            "alice",
            attributes,
            Some(noon),
            Some(noon + Duration::minutes(5)),
        )
        .unwrap();

        ServiceTicket::new(
            "ST-1-abc",
            "CAS",
            assertion,
            vec![
                ClaimEntry::new("role", "admin"),
                ClaimEntry::new("email", "a@x.com"),
            ],
        )
        .unwrap()
        .with_issued_utc(Some(noon))
        .with_expires_utc(Some(noon + Duration::minutes(5)))
    }

    #[test]
    fn test_service_ticket_round_trip() {
        let ticket = sample_ticket();
        let decoded: ServiceTicket = decode(&encode(&ticket).unwrap()).unwrap();
        assert_eq!(decoded, ticket);
        assert_eq!(decoded.claims()[0].claim_type, "role");
        assert_eq!(decoded.claims()[1].claim_type, "email");
    }

    #[test]
    fn test_string_round_trip() {
        let ticket = sample_ticket();
        let text = encode_to_string(&ticket).unwrap();
        assert_eq!(decode_from_str::<ServiceTicket>(&text).unwrap(), ticket);
    }

    #[test]
    fn test_malformed_payload() {
        let err = decode::<ServiceTicket>(b"{not json").unwrap_err();
        assert!(matches!(err, CodecError::Deserialization(_)));

        let err = decode::<ServiceTicket>(br#"{"ticket_id":"ST-1"}"#).unwrap_err();
        assert!(matches!(err, CodecError::Deserialization(_)));
    }

    #[test]
    fn test_invariant_violation_is_not_coerced() {
        let payload = br#"{
            "ticket_id": "ST-1",
            "authentication_type": "CAS",
            "assertion": {
                "principal_name": "alice",
                "valid_from": "2024-03-01T12:10:00+00:00",
                "valid_until": "2024-03-01T12:00:00+00:00"
            }
        }"#;
        let err = decode::<ServiceTicket>(payload).unwrap_err();
        assert!(matches!(err, CodecError::Invalid(_)));
    }

    #[test]
    fn test_scheme_ticket_round_trip_keeps_unknown_items() {
        let session = SchemeTicket::new(
            Principal::from_assertion(
                Assertion::new("alice").unwrap(),
                "CAS",
                vec![Claim::new(NAME_CLAIM_TYPE, "alice"), Claim::new("role", "admin")],
            ),
            AuthProperties::new()
                .with_item(SERVICE_TICKET_PROPERTY, "ST-9")
                .with_item(".redirect", "/account")
                .with_item("x-custom", "kept"),
            "Cookies",
        );

        let decoded: SchemeTicket = decode(&encode(&session).unwrap()).unwrap();
        assert_eq!(decoded, session);
        assert_eq!(
            decoded.properties.items.get("x-custom").map(String::as_str),
            Some("kept")
        );
    }

    #[test]
    fn test_identity_ticket_round_trip() {
        let noon = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let session = IdentityTicket::new(
            Identity::new("Cookies", vec![Claim::new(NAME_CLAIM_TYPE, "bob")]),
            AuthProperties::new().with_window(Some(noon), Some(noon + Duration::hours(1))),
        );

        let decoded: IdentityTicket = decode(&encode(&session).unwrap()).unwrap();
        assert_eq!(decoded, session);
        assert_eq!(decoded.identity.name(), Some("bob"));
    }

    #[test]
    fn test_scheme_ticket_without_scheme_rejected() {
        let payload = br#"{"authentication_scheme":"","identities":[]}"#;
        assert!(matches!(
            decode::<SchemeTicket>(payload),
            Err(CodecError::Invalid(_))
        ));
    }
}
