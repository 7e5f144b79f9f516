//! `paperspace_network`
//!
//! Team private networks. The create call may or may not echo the new
//! network; when it does not, the network is found by its generated name in
//! the team listing once it appears. There is no delete endpoint.

use super::found;
use crate::api::models::{region_id, CreateNetworkParams, NamedNetwork};
use crate::data::ResourceData;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::Provider;
use crate::schema::{AttrType, Attribute, Schema, Timeouts};
use serde_json::Value;
use uuid::Uuid;

pub static SCHEMA: Schema = Schema {
    type_name: "paperspace_network",
    attributes: &[
        Attribute::required("team_id", AttrType::Int),
        Attribute::optional("region", AttrType::String),
        Attribute::computed("handle", AttrType::String),
        Attribute::computed("is_taken", AttrType::Bool),
        Attribute::computed("netmask", AttrType::String),
        Attribute::computed("network", AttrType::String),
        Attribute::computed("vlan_id", AttrType::Int),
        Attribute::computed("name", AttrType::String),
    ],
    timeouts: Timeouts::new(
        std::time::Duration::from_secs(20 * 60),
        std::time::Duration::from_secs(20 * 60),
        std::time::Duration::from_secs(20 * 60),
    ),
};

const NAME_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Unique network name: `ne` followed by seven lowercase alphanumerics
pub fn generate_name() -> String {
    // bytes 9.. of a v4 UUID carry no version or variant bits
    name_from_bytes(&Uuid::new_v4().as_bytes()[9..])
}

fn name_from_bytes(bytes: &[u8]) -> String {
    let suffix: String = bytes
        .iter()
        .take(7)
        .map(|b| char::from(NAME_ALPHABET[usize::from(*b) % NAME_ALPHABET.len()]))
        .collect();
    format!("ne{}", suffix)
}

fn apply_network(data: &mut ResourceData, named: &NamedNetwork) -> ProviderResult<()> {
    let network = &named.network;
    data.set_id(network.id.to_string());
    data.set("name", Value::String(named.name.clone()))?;
    data.set("handle", Value::String(network.handle.clone()))?;
    data.set("is_taken", Value::Bool(network.is_taken))?;
    data.set("netmask", Value::String(network.netmask.clone()))?;
    data.set("network", Value::String(network.network.clone()))?;
    data.set("vlan_id", Value::from(network.vlan_id))?;
    Ok(())
}

async fn find_by_name(
    provider: &Provider,
    team_id: i64,
    name: &str,
) -> ProviderResult<NamedNetwork> {
    provider
        .api
        .list_team_networks(team_id)
        .await?
        .into_iter()
        .find(|n| n.name == name)
        .ok_or_else(|| ProviderError::not_found("private network", name))
}

async fn find_by_id_or_name(
    provider: &Provider,
    team_id: i64,
    id: &str,
    name: &str,
) -> ProviderResult<NamedNetwork> {
    let networks = provider.api.list_team_networks(team_id).await?;
    let by_id = networks.iter().position(|n| n.network.id.to_string() == id);
    let by_name = || networks.iter().position(|n| !name.is_empty() && n.name == name);

    match by_id.or_else(by_name) {
        Some(index) => Ok(networks[index].clone()),
        None => Err(ProviderError::not_found("private network", id)),
    }
}

pub async fn create(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    data.validate_required()?;
    let team_id = data.get_int("team_id");
    let region = provider.require_region(data, "creating")?;
    let region_id = region_id(&region)
        .ok_or_else(|| ProviderError::validation(format!("Region {} not found", region)))?;

    let name = generate_name();
    let params = CreateNetworkParams {
        name: name.clone(),
        region_id,
    };
    tracing::info!("Creating private network {} for team {} in {}", name, team_id, region);

    let named = match provider.api.create_team_network(team_id, &params).await? {
        Some(network) => NamedNetwork {
            name: name.clone(),
            network,
        },
        None => {
            provider
                .reconciler
                .wait_until(
                    &format!("create network {}", name),
                    data.timeouts().create,
                    || find_by_name(provider, team_id, &name),
                    |_| Ok(()),
                )
                .await?
        }
    };

    apply_network(data, &named)?;
    tracing::info!("Private network {} has id {}", name, named.network.id);
    Ok(())
}

pub async fn read(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    let id = data.require_id("read")?;
    let team_id = data.get_int("team_id");
    let name = data.get_str("name");

    let result = find_by_id_or_name(provider, team_id, &id, &name).await;
    if let Some(named) = found(result, data)? {
        apply_network(data, &named)?;
    }
    Ok(())
}

/// Networks cannot be modified in place; update refreshes state
pub async fn update(provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    read(provider, data).await
}

/// The API has no network delete call; the network is only forgotten
pub async fn delete(_provider: &Provider, data: &mut ResourceData) -> ProviderResult<()> {
    tracing::info!(
        "Private network {} cannot be deleted remotely; removing from state only",
        data.id().unwrap_or("-")
    );
    data.clear_id();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Network;

    #[test]
    fn test_generated_names() {
        let name = generate_name();
        assert_eq!(name.len(), 9);
        assert!(name.starts_with("ne"));
        assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(generate_name(), generate_name());
    }

    #[test]
    fn test_name_suffix_uses_whole_alphabet() {
        assert_eq!(name_from_bytes(&[0, 9, 10, 15, 16, 35, 36]), "ne09afgz0");
        assert_eq!(name_from_bytes(&[255, 200, 71, 1, 2, 3, 4, 5]), "ne3kz1234");

        let names: String = (0..50).map(|_| generate_name()[2..].to_string()).collect();
        assert!(names.chars().any(|c| ('g'..='z').contains(&c)));
    }

    #[test]
    fn test_apply_network_sets_id_and_fields() {
        let mut data = ResourceData::new(&SCHEMA);
        let named = NamedNetwork {
            name: "neabc1234".to_string(),
            network: Network {
                id: 77,
                handle: "nexyz".to_string(),
                is_taken: true,
                network: "10.64.0.0".to_string(),
                netmask: "255.255.240.0".to_string(),
                vlan_id: 12,
            },
        };

        apply_network(&mut data, &named).unwrap();
        assert_eq!(data.id(), Some("77"));
        assert_eq!(data.get_str("name"), "neabc1234");
        assert!(data.get_bool("is_taken"));
        assert_eq!(data.get_int("vlan_id"), 12);
    }
}
