use super::error::HueError;
use super::models::{Device, FunctionUpdate, Light, MetadataUpdate, V2Response};
use crate::error::ControlError;
use crate::pipeline::LightStateSource;
use huedmx_core::{BridgeConfig, LightUpdate};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

const APPLICATION_KEY_HEADER: &str = "hue-application-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client for one bridge
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct HueBridge {
    client: reqwest::Client,
    base_url: String,
    application_key: String,
}

impl std::fmt::Debug for HueBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HueBridge")
            .field("base_url", &self.base_url)
            .field("application_key", &"***REDACTED***")
            .finish()
    }
}

impl HueBridge {
    pub fn new(config: &BridgeConfig) -> Result<Self, HueError> {
        Self::with_base_url(
            format!("https://{}", config.address),
            config.application_key.clone(),
        )
    }

    /// Bridge reachable at `base_url` (scheme and host, no trailing slash)
    pub fn with_base_url(
        base_url: impl Into<String>,
        application_key: impl Into<String>,
    ) -> Result<Self, HueError> {
        // Bridges serve a self-signed certificate. No overall request timeout here:
        // the event stream is long-lived and guards itself with an idle timeout.
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            application_key: application_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resource_url(&self, path: &str) -> String {
        format!("{}/clip/v2/resource/{}", self.base_url, path)
    }

    async fn get_resources<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, HueError> {
        let resp = self
            .client
            .get(self.resource_url(path))
            .header(APPLICATION_KEY_HEADER, &self.application_key)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HueError::ApiError(format!(
                "GET {} failed: HTTP {} - {}",
                path, status, body
            )));
        }

        let response: V2Response<T> = resp.json().await?;
        if let Some(error) = response.errors.first() {
            return Err(HueError::ApiError(error.description.clone()));
        }
        Ok(response.data)
    }

    /// All lights on the bridge, id to name
    pub async fn list_lights(&self) -> Result<BTreeMap<String, String>, HueError> {
        let lights: Vec<Light> = self.get_resources("light").await?;
        Ok(lights
            .into_iter()
            .map(|l| (l.id, l.metadata.name))
            .collect())
    }

    /// All devices on the bridge, id to name
    pub async fn list_devices(&self) -> Result<BTreeMap<String, String>, HueError> {
        let devices: Vec<Device> = self.get_resources("device").await?;
        Ok(devices
            .into_iter()
            .map(|d| (d.id, d.metadata.name))
            .collect())
    }

    /// Current state of one light
    pub async fn get_light(&self, light_id: &str) -> Result<Light, HueError> {
        let lights: Vec<Light> = self.get_resources(&format!("light/{}", light_id)).await?;
        lights
            .into_iter()
            .next()
            .ok_or_else(|| HueError::LightNotFound(light_id.to_string()))
    }

    /// Set `metadata.function` on a light
    pub async fn set_light_function(&self, light_id: &str, function: &str) -> Result<(), HueError> {
        let body = MetadataUpdate {
            metadata: FunctionUpdate { function },
        };

        let resp = self
            .client
            .put(self.resource_url(&format!("light/{}", light_id)))
            .header(APPLICATION_KEY_HEADER, &self.application_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HueError::ApiError(format!(
                "Failed to update light {}: HTTP {} - {}",
                light_id, status, body
            )));
        }
        Ok(())
    }

    /// Open the server-sent event feed
    pub async fn open_event_stream(&self) -> Result<reqwest::Response, HueError> {
        let resp = self
            .client
            .get(format!("{}/eventstream/clip/v2", self.base_url))
            .header(APPLICATION_KEY_HEADER, &self.application_key)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(HueError::ApiError(format!(
                "Failed to open event stream: HTTP {}",
                resp.status()
            )));
        }
        Ok(resp)
    }
}

impl LightStateSource for HueBridge {
    async fn fetch_light(&self, light_id: &str) -> Result<LightUpdate, ControlError> {
        let light = self.get_light(light_id).await?;
        debug!("Fetched light {} ({})", light_id, light.metadata.name);
        Ok(light.to_update())
    }
}
