//! Typed API payloads
//!
//! Most endpoints are handled as loose JSON through the field mapper; the
//! team network and job storage endpoints return fixed shapes that are
//! decoded directly.

use serde::{Deserialize, Serialize};

/// A private network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Network {
    pub id: i64,
    pub handle: String,
    pub is_taken: bool,
    pub network: String,
    pub netmask: String,
    pub vlan_id: i64,
}

/// A network joined with its team-assigned name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedNetwork {
    pub name: String,
    pub network: Network,
}

/// Body of the create-private-network call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNetworkParams {
    pub name: String,
    pub region_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageRegion {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobStorageServer {
    #[serde(rename = "ipAddress")]
    pub ip: String,
    pub storage_region: StorageRegion,
}

/// Team job storage in one region
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobStorage {
    pub handle: String,
    pub team_id: i64,
    #[serde(rename = "jobStorageServer")]
    pub server: JobStorageServer,
}

impl JobStorage {
    pub fn region(&self) -> &str {
        &self.server.storage_region.name
    }
}

/// Region display names accepted by the network API, with their ids
pub const REGIONS: &[(&str, i64)] = &[
    ("East Coast (NY2)", 1),
    ("West Coast (CA1)", 2),
    ("Europe (AMS1)", 3),
];

pub fn region_id(name: &str) -> Option<i64> {
    REGIONS
        .iter()
        .find(|(region, _)| *region == name)
        .map(|(_, id)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_network_decodes_partial_payload() {
        let value = json!({
            "name": "ne1a2b3c4",
            "network": {
                "id": 42,
                "handle": "nexyz",
                "network": "10.0.0.0",
                "netmask": "255.255.255.0",
                "vlanId": 7
            }
        });
        let named: NamedNetwork = serde_json::from_value(value).unwrap();
        assert_eq!(named.network.id, 42);
        assert_eq!(named.network.vlan_id, 7);
        assert!(!named.network.is_taken);
    }

    #[test]
    fn test_job_storage_region() {
        let value = json!({
            "handle": "js123",
            "teamId": 9,
            "jobStorageServer": {
                "ipAddress": "10.1.1.1",
                "storageRegion": {"name": "Europe (AMS1)"}
            }
        });
        let storage: JobStorage = serde_json::from_value(value).unwrap();
        assert_eq!(storage.region(), "Europe (AMS1)");
        assert_eq!(storage.server.ip, "10.1.1.1");
    }

    #[test]
    fn test_region_ids() {
        assert_eq!(region_id("West Coast (CA1)"), Some(2));
        assert_eq!(region_id("Mars (MRS1)"), None);
    }

    #[test]
    fn test_create_params_wire_names() {
        let params = CreateNetworkParams { name: "neabc".to_string(), region_id: 3 };
        assert_eq!(serde_json::to_value(params).unwrap(), json!({"name": "neabc", "regionId": 3}));
    }
}
