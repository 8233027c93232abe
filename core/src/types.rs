//! Resource records and operation inputs for the service API.
//!
//! # Design
//! The wire-to-field mapping is declared with serde attributes on each
//! record, so the whole schema is checked at compile time. Fields the API
//! may send as `null` or with loose scalar types go through the helpers in
//! [`crate::de`]. Optional timestamps are `Option` (absent means the event
//! never happened); every other field falls back to its zero value.
//!
//! Records are immutable snapshots of one response. Nothing here is cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::de;

/// One numbered configuration snapshot of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default, deserialize_with = "de::flexible_u64")]
    pub number: u64,
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub active: bool,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub service_id: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub locked: bool,
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub deployed: bool,
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub staging: bool,
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub testing: bool,
    #[serde(default, deserialize_with = "de::flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::flexible_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::flexible_timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Summary record for one managed service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "de::null_as_default")]
    pub service_type: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub customer_id: String,
    #[serde(default, deserialize_with = "de::flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::flexible_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::flexible_timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Number of the version serving traffic; zero when none is active.
    #[serde(rename = "version", default, deserialize_with = "de::flexible_u64")]
    pub active_version: u64,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub versions: Vec<Version>,
}

impl Service {
    /// Derive `active_version` from the first version flagged active.
    ///
    /// Leaves the field untouched when no version is active.
    pub fn backfill_active_version(&mut self) {
        if let Some(v) = self.versions.iter().find(|v| v.active) {
            self.active_version = v.number;
        }
    }
}

/// Expanded record for one service with its active and working versions
/// materialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDetail {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "de::null_as_default")]
    pub service_type: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub customer_id: String,
    /// Zero-valued when the service has never been activated.
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub active_version: Version,
    /// The working version, which may differ from the active one.
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub version: Version,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub versions: Vec<Version>,
    #[serde(default, deserialize_with = "de::flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::flexible_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::flexible_timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A domain bound to one version of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDomain {
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub locked: bool,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub service_id: String,
    #[serde(rename = "version", default, deserialize_with = "de::flexible_i64")]
    pub service_version: i64,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "de::flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::flexible_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::flexible_timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Domains in the order the API returned them.
pub type ServiceDomainsList = Vec<ServiceDomain>;

/// The `{"status": "ok"}` envelope returned by destructive endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl StatusResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListServicesInput {}

/// Form fields for a new service. Empty strings are left out of the request
/// and the remote side applies its own defaults and validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateServiceInput {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub service_type: String,
    #[serde(default)]
    pub comment: String,
}

impl CreateServiceInput {
    pub(crate) fn form_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", self.name.as_str()),
            ("type", self.service_type.as_str()),
            ("comment", self.comment.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect()
    }
}

/// Identifies one service for get, details and domain listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetServiceInput {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListServiceDomainInput {
    pub id: String,
}

/// Partial update of a service. `None` leaves the field unchanged; a
/// `Some("")` comment clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateServiceInput {
    pub service_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl UpdateServiceInput {
    pub(crate) fn form_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(name) = &self.name {
            pairs.push(("name", name.as_str()));
        }
        if let Some(comment) = &self.comment {
            pairs.push(("comment", comment.as_str()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteServiceInput {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchServiceInput {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(number: u64, active: bool) -> Version {
        Version {
            number,
            active,
            ..Version::default()
        }
    }

    #[test]
    fn backfill_picks_the_active_version() {
        let mut s = Service {
            versions: vec![version(1, false), version(2, true), version(3, false)],
            ..Service::default()
        };
        s.backfill_active_version();
        assert_eq!(s.active_version, 2);
    }

    #[test]
    fn backfill_without_active_version_keeps_zero() {
        let mut s = Service {
            versions: vec![version(1, false), version(2, false)],
            ..Service::default()
        };
        s.backfill_active_version();
        assert_eq!(s.active_version, 0);
    }

    #[test]
    fn service_decodes_wire_names() {
        let s: Service = serde_json::from_str(
            r#"{"id":"SU1Z0isxPaozGVKXdv0eY","name":"Example","type":"vcl",
                "comment":null,"customer_id":"x4xCwxxJxGCx123Rx5xTx",
                "created_at":"2016-05-12T21:31:36Z","updated_at":"2016-05-12T21:31:36Z",
                "deleted_at":null,"version":"3",
                "versions":[{"number":3,"active":"1","locked":true}]}"#,
        )
        .unwrap();
        assert_eq!(s.service_type, "vcl");
        assert_eq!(s.comment, "");
        assert_eq!(s.active_version, 3);
        assert!(s.created_at.is_some());
        assert!(s.deleted_at.is_none());
        assert!(s.versions[0].active);
        assert!(s.versions[0].locked);
    }

    #[test]
    fn null_or_missing_keys_decode_empty() {
        let s: Service = serde_json::from_str(r#"{"id":null,"name":"no id"}"#).unwrap();
        assert_eq!(s.id, "");
        assert_eq!(s.name, "no id");

        let d: ServiceDetail = serde_json::from_str(r#"{"name":"detail"}"#).unwrap();
        assert_eq!(d.id, "");

        let domain: ServiceDomain = serde_json::from_str(r#"{"name":null,"version":1}"#).unwrap();
        assert_eq!(domain.name, "");
        assert_eq!(domain.service_version, 1);
    }

    #[test]
    fn version_numbers_beyond_u32() {
        let s: Service = serde_json::from_str(
            r#"{"id":"abc","version":5000000000,"versions":[{"number":5000000001,"active":true}]}"#,
        )
        .unwrap();
        assert_eq!(s.active_version, 5_000_000_000);
        assert_eq!(s.versions[0].number, 5_000_000_001);
    }

    #[test]
    fn detail_null_active_version_is_zero_valued() {
        let d: ServiceDetail = serde_json::from_str(
            r#"{"id":"abc","active_version":null,"version":{"number":1,"active":false}}"#,
        )
        .unwrap();
        assert_eq!(d.active_version, Version::default());
        assert_eq!(d.version.number, 1);
        assert!(d.versions.is_empty());
    }

    #[test]
    fn domain_version_is_signed() {
        let d: ServiceDomain =
            serde_json::from_str(r#"{"name":"example.com","version":-1,"locked":0}"#).unwrap();
        assert_eq!(d.service_version, -1);
        assert!(!d.locked);
    }

    #[test]
    fn create_form_omits_empty_fields() {
        let input = CreateServiceInput {
            name: "svc".to_string(),
            ..CreateServiceInput::default()
        };
        assert_eq!(input.form_pairs(), vec![("name", "svc")]);
    }

    #[test]
    fn update_form_keeps_empty_comment() {
        let input = UpdateServiceInput {
            service_id: "abc".to_string(),
            name: None,
            comment: Some(String::new()),
        };
        assert_eq!(input.form_pairs(), vec![("comment", "")]);
    }

    #[test]
    fn status_response_ok() {
        let r: StatusResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(r.is_ok());
        let r: StatusResponse = serde_json::from_str(r#"{"status":"error","msg":"nope"}"#).unwrap();
        assert!(!r.is_ok());
        assert_eq!(r.msg.as_deref(), Some("nope"));
    }
}
