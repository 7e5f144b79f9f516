//! Paperspace API client
//!
//! Combines the HTTP wrapper with the API host and exposes one method per
//! endpoint used by the lifecycle controllers.

use super::http::{ApiHttpClient, ApiResponse};
use super::models::{CreateNetworkParams, JobStorage, NamedNetwork, Network};
use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};
use serde_json::Value;
use url::Url;
use urlencoding::encode;

/// Main Paperspace client
#[derive(Clone)]
pub struct ApiClient {
    pub http: ApiHttpClient,
    pub api_host: String,
}

impl ApiClient {
    /// Create a client from a resolved provider configuration
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        let http = ApiHttpClient::new(&config.api_key)?;
        Ok(Self {
            http,
            api_host: config.api_host.trim_end_matches('/').to_string(),
        })
    }

    /// Build an API URL from a path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_host, path)
    }

    /// Build an API URL with encoded query parameters
    pub fn url_with_query(&self, path: &str, query: &[(&str, String)]) -> ProviderResult<String> {
        let url = Url::parse_with_params(&self.url(path), query)
            .map_err(|e| ProviderError::Config(format!("invalid API URL for {}: {}", path, e)))?;
        Ok(url.to_string())
    }

    // =========================================================================
    // Machines
    // =========================================================================

    /// Create a machine and return its id
    pub async fn create_machine(&self, body: &Value) -> ProviderResult<String> {
        let response = self
            .http
            .post(&self.url("/machines/createSingleMachinePublic"), Some(body))
            .await?;

        let body = expect_status(response, "CreateMachine", &[200])?;
        match id_of(&body) {
            Some(id) => Ok(id),
            None => Err(ProviderError::decode("CreateMachine response", "id not found")),
        }
    }

    /// Fetch a machine; 404 or a body without id means not found
    pub async fn get_machine(&self, id: &str) -> ProviderResult<Value> {
        let url =
            self.url_with_query("/machines/getMachinePublic", &[("machineId", id.to_string())])?;
        let response = self.http.get(&url).await?;

        if response.is_not_found() {
            return Err(ProviderError::not_found("machine", id));
        }
        let body = expect_status(response, "GetMachine", &[200])?;
        if id_of(&body).is_none() {
            return Err(ProviderError::not_found("machine", id));
        }
        Ok(body)
    }

    /// Start destroying a machine. Success is judged on status alone.
    pub async fn destroy_machine(&self, id: &str) -> ProviderResult<()> {
        let url = self.url(&format!("/machines/{}/destroyMachine", encode(id)));
        let response = self.http.post(&url, None).await?;

        if response.is_not_found() {
            return Err(ProviderError::not_found("machine", id));
        }
        expect_status(response, "DestroyMachine", &[200, 204]).map(|_| ())
    }

    // =========================================================================
    // Scripts
    // =========================================================================

    pub async fn create_script(&self, body: &Value) -> ProviderResult<Value> {
        let response = self.http.post(&self.url("/scripts/createScript"), Some(body)).await?;
        let body = expect_status(response, "CreateScript", &[200])?;
        if id_of(&body).is_none() {
            return Err(ProviderError::decode("CreateScript response", "id not found"));
        }
        Ok(body)
    }

    pub async fn get_script(&self, id: &str) -> ProviderResult<Value> {
        let url = self.url_with_query("/scripts/getScript", &[("scriptId", id.to_string())])?;
        let response = self.http.get(&url).await?;

        if response.is_not_found() {
            return Err(ProviderError::not_found("script", id));
        }
        let body = expect_status(response, "GetScript", &[200])?;
        if id_of(&body).is_none() {
            return Err(ProviderError::not_found("script", id));
        }
        Ok(body)
    }

    /// Script body text, or `None` when the API has no text for it
    pub async fn get_script_text(&self, id: &str) -> ProviderResult<Option<String>> {
        let url = self.url_with_query("/scripts/getScriptText", &[("scriptId", id.to_string())])?;
        let response = self.http.get(&url).await?;

        if response.is_not_found() {
            return Ok(None);
        }
        match expect_status(response, "GetScriptText", &[200])? {
            Value::Null => Ok(None),
            Value::String(text) => Ok(Some(text)),
            other => Ok(Some(other.to_string())),
        }
    }

    pub async fn destroy_script(&self, id: &str) -> ProviderResult<()> {
        let url = self.url(&format!("/scripts/{}/destroy", encode(id)));
        let response = self.http.post(&url, None).await?;

        if response.is_not_found() {
            return Err(ProviderError::not_found("script", id));
        }
        expect_status(response, "DestroyScript", &[200, 204]).map(|_| ())
    }

    // =========================================================================
    // Private networks
    // =========================================================================

    /// Request a team network. Returns the network when the API confirms it
    /// synchronously; `None` means it must be looked up by name.
    pub async fn create_team_network(
        &self,
        team_id: i64,
        params: &CreateNetworkParams,
    ) -> ProviderResult<Option<Network>> {
        let url = self.url(&format!("/teams/{}/createPrivateNetwork", team_id));
        let body = serde_json::to_value(params)
            .map_err(|e| ProviderError::decode("CreatePrivateNetwork request", e))?;
        let response = self.http.post(&url, Some(&body)).await?;
        let body = expect_status(response, "CreatePrivateNetwork", &[200, 201, 204])?;

        let confirmed = serde_json::from_value::<Network>(body)
            .ok()
            .filter(|network| network.id != 0);
        Ok(confirmed)
    }

    pub async fn list_team_networks(&self, team_id: i64) -> ProviderResult<Vec<NamedNetwork>> {
        let url = self.url(&format!("/teams/{}/getNetworks", team_id));
        let response = self.http.get(&url).await?;
        let body = expect_status(response, "GetNetworks", &[200])?;
        decode_list(body, "GetNetworks response")
    }

    // =========================================================================
    // Autoscaling groups
    // =========================================================================

    pub async fn create_autoscaling_group(&self, body: &Value) -> ProviderResult<String> {
        let response = self.http.post(&self.url("/autoscalingGroups"), Some(body)).await?;
        let body = expect_status(response, "CreateAutoscalingGroup", &[200, 201])?;
        match id_of(&body) {
            Some(id) => Ok(id),
            None => Err(ProviderError::decode("CreateAutoscalingGroup response", "id not found")),
        }
    }

    pub async fn get_autoscaling_group(&self, id: &str) -> ProviderResult<Value> {
        let url = self.url(&format!("/autoscalingGroups/{}", encode(id)));
        let response = self.http.get(&url).await?;

        if response.is_not_found() {
            return Err(ProviderError::not_found("autoscaling group", id));
        }
        expect_status(response, "GetAutoscalingGroup", &[200])
    }

    pub async fn update_autoscaling_group(&self, id: &str, body: &Value) -> ProviderResult<()> {
        let url = self.url(&format!("/autoscalingGroups/{}", encode(id)));
        let response = self.http.put(&url, body).await?;

        if response.is_not_found() {
            return Err(ProviderError::not_found("autoscaling group", id));
        }
        expect_status(response, "UpdateAutoscalingGroup", &[200, 204]).map(|_| ())
    }

    pub async fn delete_autoscaling_group(&self, id: &str) -> ProviderResult<()> {
        let url = self.url(&format!("/autoscalingGroups/{}", encode(id)));
        let response = self.http.delete(&url).await?;

        if response.is_not_found() {
            return Err(ProviderError::not_found("autoscaling group", id));
        }
        expect_status(response, "DeleteAutoscalingGroup", &[200, 204]).map(|_| ())
    }

    // =========================================================================
    // Job storage
    // =========================================================================

    pub async fn list_job_storage(&self, team_id: i64) -> ProviderResult<Vec<JobStorage>> {
        let url = self.url(&format!("/accounts/team/{}/getJobStorage", team_id));
        let response = self.http.get(&url).await?;
        let body = expect_status(response, "GetJobStorage", &[200])?;
        decode_list(body, "GetJobStorage response")
    }

    /// Job storage serving `region`, if the team has one there
    pub async fn job_storage_in_region(
        &self,
        team_id: i64,
        region: &str,
    ) -> ProviderResult<Option<JobStorage>> {
        let storages = self.list_job_storage(team_id).await?;
        Ok(storages.into_iter().find(|s| s.region() == region))
    }

    // =========================================================================
    // Filtered listings (data sources)
    // =========================================================================

    /// GET a listing endpoint with query filters; 404 means nothing matched
    pub async fn list(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> ProviderResult<Vec<Value>> {
        let url = self.url_with_query(path, query)?;
        let response = self.http.get(&url).await?;

        if response.is_not_found() {
            return Err(ProviderError::not_found(operation, format!("{:?}", query)));
        }
        match expect_status(response, operation, &[200])? {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(ProviderError::decode(
                format!("{} response", operation),
                format!("expected an array, got {}", other),
            )),
        }
    }
}

/// Accept the listed statuses, turning anything else into a status error
fn expect_status(
    response: ApiResponse,
    operation: &str,
    accepted: &[u16],
) -> ProviderResult<Value> {
    if accepted.contains(&response.status) {
        Ok(response.body)
    } else {
        Err(ProviderError::status(operation, response.status, &response.body))
    }
}

fn decode_list<T>(body: Value, context: &str) -> ProviderResult<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    if body.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(body).map_err(|e| ProviderError::decode(context, e))
}

/// Non-empty string `id` of an object body
pub fn id_of(body: &Value) -> Option<String> {
    match body.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ApiClient {
        ApiClient::new(&ProviderConfig {
            api_key: "key".to_string(),
            api_host: "https://api.paperspace.io/".to_string(),
            region: None,
        })
        .unwrap()
    }

    #[test]
    fn test_url_trims_host_slash() {
        assert_eq!(
            client().url("/scripts/createScript"),
            "https://api.paperspace.io/scripts/createScript"
        );
    }

    #[test]
    fn test_url_with_query_encodes() {
        let query = [("name", "Ubuntu 22.04 & CUDA".to_string())];
        let url = client().url_with_query("/templates/getTemplates", &query).unwrap();
        assert_eq!(
            url,
            "https://api.paperspace.io/templates/getTemplates?name=Ubuntu+22.04+%26+CUDA"
        );
    }

    #[test]
    fn test_id_of() {
        assert_eq!(id_of(&json!({"id": "ps1"})), Some("ps1".to_string()));
        assert_eq!(id_of(&json!({"id": 12})), Some("12".to_string()));
        assert_eq!(id_of(&json!({"id": ""})), None);
        assert_eq!(id_of(&json!([])), None);
    }

    #[test]
    fn test_expect_status() {
        let ok = ApiResponse { status: 204, body: Value::Null };
        assert!(expect_status(ok, "DestroyMachine", &[200, 204]).is_ok());

        let bad = ApiResponse { status: 400, body: json!({"error": "bad"}) };
        let err = expect_status(bad, "CreateMachine", &[200]).unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 400, .. }));
    }
}
