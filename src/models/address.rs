//! Per-address records nested under the looked-up address in a response

use serde::{Deserialize, Serialize};

use crate::models::field::{field, object_field, string_field, unset, Document, ModelResult};

/// Everything the service reports about a single address.
///
/// All leaves are kept as the raw strings the service returned; coordinates
/// and timestamps are not parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub asn: String,
    pub provider: String,
    pub continent: String,
    pub continent_code: String,
    pub country: String,
    pub iso_code: String,
    pub timezone: String,
    pub latitude: String,
    pub longitude: String,
    pub currency: CurrencyRecord,
    /// "yes" / "no"
    pub proxy: String,
    /// Connection type, e.g. "VPN", "Business", "Residential"
    pub connection_type: String,
    pub risk: String,
    pub last_seen_human: String,
    pub last_seen_unix: String,
    pub operator: OperatorRecord,
    pub attack_history: AttackHistoryRecord,
}

impl AddressRecord {
    pub fn from_document(doc: Option<&Document>) -> ModelResult<Self> {
        Ok(Self {
            asn: string_field(doc, "asn")?,
            provider: string_field(doc, "provider")?,
            continent: string_field(doc, "continent")?,
            continent_code: string_field(doc, "continentcode")?,
            country: string_field(doc, "country")?,
            iso_code: string_field(doc, "isocode")?,
            timezone: string_field(doc, "timezone")?,
            latitude: string_field(doc, "latitude")?,
            longitude: string_field(doc, "longitude")?,
            currency: CurrencyRecord::from_document(object_field(doc, "currency")?)?,
            proxy: string_field(doc, "proxy")?,
            connection_type: string_field(doc, "type")?,
            risk: string_field(doc, "risk")?,
            last_seen_human: string_field(doc, "last seen human")?,
            last_seen_unix: string_field(doc, "last seen unix")?,
            operator: OperatorRecord::from_document(object_field(doc, "operator")?)?,
            attack_history: AttackHistoryRecord::from_document(object_field(
                doc,
                "attack history",
            )?)?,
        })
    }

    pub fn is_proxy(&self) -> bool {
        self.proxy.eq_ignore_ascii_case("yes")
    }
}

impl Default for AddressRecord {
    fn default() -> Self {
        Self {
            asn: unset(),
            provider: unset(),
            continent: unset(),
            continent_code: unset(),
            country: unset(),
            iso_code: unset(),
            timezone: unset(),
            latitude: unset(),
            longitude: unset(),
            currency: CurrencyRecord::default(),
            proxy: unset(),
            connection_type: unset(),
            risk: unset(),
            last_seen_human: unset(),
            last_seen_unix: unset(),
            operator: OperatorRecord::default(),
            attack_history: AttackHistoryRecord::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRecord {
    pub code: String,
    pub name: String,
    pub symbol: String,
}

impl CurrencyRecord {
    pub fn from_document(doc: Option<&Document>) -> ModelResult<Self> {
        Ok(Self {
            code: string_field(doc, "code")?,
            name: string_field(doc, "name")?,
            symbol: string_field(doc, "symbol")?,
        })
    }
}

impl Default for CurrencyRecord {
    fn default() -> Self {
        Self {
            code: unset(),
            name: unset(),
            symbol: unset(),
        }
    }
}

/// VPN operator details, only present for addresses attributed to a
/// known VPN service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorRecord {
    pub name: String,
    pub url: String,
    pub anonymity: String,
    pub popularity: String,
    /// Supported protocols in upstream order, empty when not reported
    pub protocols: Vec<String>,
    pub policies: OperatorPolicyRecord,
}

impl OperatorRecord {
    pub fn from_document(doc: Option<&Document>) -> ModelResult<Self> {
        Ok(Self {
            name: string_field(doc, "name")?,
            url: string_field(doc, "url")?,
            anonymity: string_field(doc, "anonymity")?,
            popularity: string_field(doc, "popularity")?,
            protocols: field(doc, "protocols", Vec::new())?,
            policies: OperatorPolicyRecord::from_document(object_field(doc, "policies")?)?,
        })
    }
}

impl Default for OperatorRecord {
    fn default() -> Self {
        Self {
            name: unset(),
            url: unset(),
            anonymity: unset(),
            popularity: unset(),
            protocols: Vec::new(),
            policies: OperatorPolicyRecord::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorPolicyRecord {
    pub ad_filtering: String,
    pub free_access: String,
    pub paid_access: String,
    pub port_forwarding: String,
    pub logging: String,
    pub anonymous_payments: String,
    pub crypto_payments: String,
    pub traceable_ownership: String,
}

impl OperatorPolicyRecord {
    pub fn from_document(doc: Option<&Document>) -> ModelResult<Self> {
        Ok(Self {
            ad_filtering: string_field(doc, "ad_filtering")?,
            free_access: string_field(doc, "free_access")?,
            paid_access: string_field(doc, "paid_access")?,
            port_forwarding: string_field(doc, "port_forwarding")?,
            logging: string_field(doc, "logging")?,
            anonymous_payments: string_field(doc, "anonymous_payments")?,
            crypto_payments: string_field(doc, "crypto_payments")?,
            traceable_ownership: string_field(doc, "traceable_ownership")?,
        })
    }
}

impl Default for OperatorPolicyRecord {
    fn default() -> Self {
        Self {
            ad_filtering: unset(),
            free_access: unset(),
            paid_access: unset(),
            port_forwarding: unset(),
            logging: unset(),
            anonymous_payments: unset(),
            crypto_payments: unset(),
            traceable_ownership: unset(),
        }
    }
}

/// Attack counters observed for the address over the `days` window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackHistoryRecord {
    pub total: String,
    pub vulnerability_probing: String,
    pub forum_spam: String,
    pub login_attempt: String,
    pub registration_attempt: String,
}

impl AttackHistoryRecord {
    pub fn from_document(doc: Option<&Document>) -> ModelResult<Self> {
        Ok(Self {
            total: string_field(doc, "total")?,
            vulnerability_probing: string_field(doc, "Vulnerability Probing")?,
            forum_spam: string_field(doc, "Forum Spam")?,
            login_attempt: string_field(doc, "Login Attempt")?,
            registration_attempt: string_field(doc, "Registration Attempt")?,
        })
    }
}

impl Default for AttackHistoryRecord {
    fn default() -> Self {
        Self {
            total: unset(),
            vulnerability_probing: unset(),
            forum_spam: unset(),
            login_attempt: unset(),
            registration_attempt: unset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field::{ModelError, FIELD_IS_NOT_SET};
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    #[test]
    fn test_full_address_record() {
        let d = doc(json!({
            "asn": "AS213250",
            "provider": "ProHosting24 GmbH",
            "continent": "Europe",
            "continentcode": "EU",
            "country": "Germany",
            "isocode": "DE",
            "timezone": "Europe/Berlin",
            "latitude": 51.2993,
            "longitude": 9.491,
            "currency": { "code": "EUR", "name": "Euro", "symbol": "€" },
            "proxy": "yes",
            "type": "VPN",
            "risk": 66,
            "last seen human": "2 hours ago",
            "last seen unix": "1700000000",
            "operator": {
                "name": "ExampleVPN",
                "url": "https://vpn.example",
                "anonymity": "high",
                "popularity": "medium",
                "protocols": ["WireGuard", "OpenVPN"],
                "policies": {
                    "ad_filtering": "yes",
                    "free_access": "no",
                    "paid_access": "yes",
                    "port_forwarding": "no",
                    "logging": "no",
                    "anonymous_payments": "yes",
                    "crypto_payments": "yes",
                    "traceable_ownership": "no"
                }
            },
            "attack history": {
                "total": 12,
                "Vulnerability Probing": 7,
                "Login Attempt": 5
            }
        }));

        let record = AddressRecord::from_document(Some(&d)).unwrap();
        assert_eq!(record.asn, "AS213250");
        assert_eq!(record.continent_code, "EU");
        assert_eq!(record.iso_code, "DE");
        assert_eq!(record.latitude, "51.2993");
        assert_eq!(record.risk, "66");
        assert_eq!(record.connection_type, "VPN");
        assert!(record.is_proxy());
        assert_eq!(record.currency.symbol, "€");
        assert_eq!(record.operator.protocols, vec!["WireGuard", "OpenVPN"]);
        assert_eq!(record.operator.policies.crypto_payments, "yes");
        assert_eq!(record.attack_history.total, "12");
        assert_eq!(record.attack_history.forum_spam, FIELD_IS_NOT_SET);
    }

    #[test]
    fn test_absent_document_is_all_sentinels() {
        let record = AddressRecord::from_document(None).unwrap();
        assert_eq!(record, AddressRecord::default());
        assert_eq!(record.country, FIELD_IS_NOT_SET);
        assert_eq!(record.operator.policies.logging, FIELD_IS_NOT_SET);
        assert!(record.operator.protocols.is_empty());
        assert!(!record.is_proxy());
    }

    #[test]
    fn test_every_leaf_defaults_when_missing() {
        let record = AddressRecord::from_document(Some(&doc(json!({})))).unwrap();
        let serialized = serde_json::to_value(&record).unwrap();

        fn check(value: &Value) {
            match value {
                Value::String(s) => assert_eq!(s, FIELD_IS_NOT_SET),
                Value::Object(map) => map.values().for_each(check),
                Value::Array(items) => assert!(items.is_empty()),
                other => panic!("unexpected leaf {other:?}"),
            }
        }
        check(&serialized);
    }

    #[test]
    fn test_nested_record_with_wrong_shape() {
        let d = doc(json!({ "currency": "EUR" }));
        let err = AddressRecord::from_document(Some(&d)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::UnexpectedShape { ref field, expected: "object", found: "string" } if field == "currency"
        ));
    }

    #[test]
    fn test_operator_without_policies() {
        let d = doc(json!({ "name": "Y", "protocols": ["SOCKS5"] }));
        let operator = OperatorRecord::from_document(Some(&d)).unwrap();
        assert_eq!(operator.name, "Y");
        assert_eq!(operator.protocols, vec!["SOCKS5"]);
        assert_eq!(operator.policies, OperatorPolicyRecord::default());
    }
}
