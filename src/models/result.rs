use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::address::AddressRecord;
use crate::models::field::{
    object_field, required_string_field, string_field, Document, ModelResult,
};

/// Outcome of one address lookup, tagged by the upstream `status` field
///
/// [`LookupClient`](crate::LookupClient) only hands out `Success`; a `Denied`
/// or `Error` document becomes [`LookupError::Blocked`](crate::LookupError::Blocked)
/// and is never cached. Those variants are produced by
/// [`from_document`](Self::from_document) for callers classifying documents
/// themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum LookupResult {
    Success(SuccessRecord),
    Denied(StatusRecord),
    Error(StatusRecord),
}

impl LookupResult {
    /// Classify a response document.
    ///
    /// `address` is the address that was queried: successful responses nest
    /// the per-address data under a key equal to it. `status` is compared
    /// case-insensitively; `denied` and `error` are blocking, anything else
    /// (`ok`, `warning`, ...) is a success.
    ///
    /// # Errors
    /// Fails when `status` is missing or any field has an unexpected shape.
    pub fn from_document(doc: &Document, address: &str) -> ModelResult<Self> {
        let status = required_string_field(doc, "status")?;

        if status.eq_ignore_ascii_case("denied") {
            return Ok(Self::Denied(StatusRecord::new(status, doc)?));
        }
        if status.eq_ignore_ascii_case("error") {
            return Ok(Self::Error(StatusRecord::new(status, doc)?));
        }

        Ok(Self::Success(SuccessRecord {
            node: string_field(Some(doc), "node")?,
            query_time: string_field(Some(doc), "query time")?,
            address: address.to_string(),
            record: AddressRecord::from_document(object_field(Some(doc), address)?)?,
            raw: Value::Object(doc.clone()),
            status,
        }))
    }

    pub fn status(&self) -> &str {
        match self {
            Self::Success(success) => &success.status,
            Self::Denied(record) | Self::Error(record) => &record.status,
        }
    }

    /// Whether the service refused or failed the query. Always `false` for
    /// results returned by the client.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Denied(_) | Self::Error(_))
    }

    pub fn as_success(&self) -> Option<&SuccessRecord> {
        match self {
            Self::Success(success) => Some(success),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessRecord {
    pub status: String,
    /// Service node that answered the query
    pub node: String,
    pub query_time: String,
    /// The address that was looked up
    pub address: String,
    pub record: AddressRecord,
    /// Full upstream document, for fields not mapped above
    #[serde(skip)]
    pub raw: Value,
}

/// Status and message of a denied or failed query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: String,
    pub message: String,
}

impl StatusRecord {
    fn new(status: String, doc: &Document) -> ModelResult<Self> {
        Ok(Self {
            status,
            message: string_field(Some(doc), "message")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field::{ModelError, FIELD_IS_NOT_SET};
    use serde_json::json;

    const ADDRESS: &str = "45.142.115.247";

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    #[test]
    fn test_success_document() {
        let d = doc(json!({
            "status": "ok",
            "node": "N1",
            "query time": "0.1s",
            ADDRESS: {
                "asn": "AS1234",
                "provider": "X",
                "country": "Germany",
                "currency": { "code": "EUR" },
                "operator": { "name": "Y", "protocols": ["SOCKS5"] }
            }
        }));

        let result = LookupResult::from_document(&d, ADDRESS).unwrap();
        assert!(!result.is_blocking());
        assert_eq!(result.status(), "ok");

        let success = result.as_success().unwrap();
        assert_eq!(success.node, "N1");
        assert_eq!(success.query_time, "0.1s");
        assert_eq!(success.address, ADDRESS);
        assert_eq!(success.record.country, "Germany");
        assert_eq!(success.record.currency.code, "EUR");
        assert_eq!(success.record.currency.name, FIELD_IS_NOT_SET);
        assert_eq!(success.record.operator.protocols, vec!["SOCKS5"]);
        assert_eq!(success.record.timezone, FIELD_IS_NOT_SET);
        assert_eq!(success.raw["node"], json!("N1"));
    }

    #[test]
    fn test_status_is_case_insensitive() {
        for status in ["denied", "DENIED", "Denied"] {
            let d = doc(json!({ "status": status, "message": "quota exceeded" }));
            let result = LookupResult::from_document(&d, ADDRESS).unwrap();
            assert!(matches!(result, LookupResult::Denied(_)), "status {status}");
            assert_eq!(result.status(), status);
        }

        for status in ["error", "ERROR", "eRrOr"] {
            let d = doc(json!({ "status": status, "message": "bad key" }));
            let result = LookupResult::from_document(&d, ADDRESS).unwrap();
            assert!(matches!(
                result,
                LookupResult::Error(StatusRecord { ref message, .. }) if message == "bad key"
            ));
        }
    }

    #[test]
    fn test_warning_is_success() {
        let d = doc(json!({
            "status": "warning",
            "message": "Your API Key has been disabled for a violation of our terms of service.",
            ADDRESS: { "proxy": "no" }
        }));
        let result = LookupResult::from_document(&d, ADDRESS).unwrap();
        let success = result.as_success().unwrap();
        assert_eq!(success.status, "warning");
        assert_eq!(success.record.proxy, "no");
    }

    #[test]
    fn test_success_without_address_payload() {
        let d = doc(json!({ "status": "ok" }));
        let result = LookupResult::from_document(&d, ADDRESS).unwrap();
        assert_eq!(result.as_success().unwrap().record, AddressRecord::default());
    }

    #[test]
    fn test_blocking_without_message_uses_sentinel() {
        let d = doc(json!({ "status": "denied" }));
        match LookupResult::from_document(&d, ADDRESS).unwrap() {
            LookupResult::Denied(record) => assert_eq!(record.message, FIELD_IS_NOT_SET),
            other => panic!("expected denied, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_status() {
        let d = doc(json!({ "node": "N1" }));
        assert!(matches!(
            LookupResult::from_document(&d, ADDRESS),
            Err(ModelError::MissingField { .. })
        ));
    }

    #[test]
    fn test_non_string_status() {
        let d = doc(json!({ "status": ["ok"] }));
        assert!(matches!(
            LookupResult::from_document(&d, ADDRESS),
            Err(ModelError::UnexpectedShape { .. })
        ));
    }
}
