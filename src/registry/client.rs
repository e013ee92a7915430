use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, AppResult};

use super::catalog::Catalog;

const CATALOG_ENDPOINT: &str = "registry";

/// Fetches the plugin catalog a dispatcher exposes.
#[derive(Debug, Clone)]
pub struct DispatcherClient {
    http: Client,
}

impl DispatcherClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    pub async fn fetch_catalog(&self, dispatcher: &Url) -> AppResult<Catalog> {
        let catalog: Catalog = self.get_json(dispatcher, CATALOG_ENDPOINT).await?;
        tracing::debug!(
            %dispatcher,
            plugins = catalog.plugins.len(),
            modules = catalog.modules.len(),
            "fetched plugin catalog"
        );
        Ok(catalog)
    }

    async fn get_json<T: DeserializeOwned>(&self, base: &Url, endpoint: &str) -> AppResult<T> {
        let url = endpoint_url(base, endpoint)?;
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        self.parse_json_response(response).await
    }

    async fn parse_json_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_api_error(status, &body))
    }
}

impl Default for DispatcherClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Appends `endpoint` to the dispatcher's base path, keeping any prefix.
fn endpoint_url(base: &Url, endpoint: &str) -> AppResult<Url> {
    if base.cannot_be_a_base() {
        return Err(AppError::Config(format!(
            "dispatcher url `{base}` cannot carry a path"
        )));
    }

    let mut url = base.clone();
    let path = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    );
    url.set_path(&path);
    url.set_query(None);
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct DispatcherErrorEnvelope {
    error: DispatcherError,
}

#[derive(Debug, Deserialize)]
struct DispatcherError {
    code: Option<u16>,
    message: Option<String>,
}

fn map_api_error(status: StatusCode, body: &str) -> AppError {
    let message = parse_api_error_message(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            "no error details in response body".to_string()
        } else {
            body.to_string()
        }
    });

    if status == StatusCode::NOT_FOUND {
        return AppError::Registry(format!(
            "dispatcher does not expose a plugin catalog ({status}): {message}"
        ));
    }

    AppError::Registry(format!("dispatcher request failed ({status}): {message}"))
}

fn parse_api_error_message(body: &str) -> Option<String> {
    let envelope = serde_json::from_str::<DispatcherErrorEnvelope>(body).ok()?;
    let mut parts = Vec::new();

    if let Some(message) = envelope.error.message {
        parts.push(message);
    }

    if let Some(code) = envelope.error.code {
        parts.push(format!("code={code}"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts.join(", "))
}
