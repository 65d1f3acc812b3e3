//! reqwest transport.
//!
//! The refresh token never leaves the client's cookie jar: the server sets it
//! on login and rotates it on every renewal. Clearing the session swaps in a
//! fresh client with an empty jar.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{SessionClient, Transport};
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::request::{AccessTokenData, ApiRequest, ApiResponse, Method};

const STORE_HEADER: &str = "store-id";

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

pub struct HttpTransport {
    config: SessionConfig,
    client: RwLock<Client>,
}

impl HttpTransport {
    pub fn new(config: SessionConfig) -> SessionResult<Self> {
        let client = build_client(&config)?;
        Ok(HttpTransport {
            config,
            client: RwLock::new(client),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn client(&self) -> Client {
        match self.client.read() {
            Ok(client) => client.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

fn build_client(config: &SessionConfig) -> SessionResult<Client> {
    Client::builder()
        .cookie_store(true)
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| SessionError::Transport(e.to_string()))
}

async fn read_response(response: reqwest::Response) -> SessionResult<ApiResponse> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(SessionError::AuthExpired);
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| SessionError::Transport(e.to_string()))?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).map_err(|e| SessionError::Decode(e.to_string()))?
    };

    Ok(ApiResponse::new(status.as_u16(), body))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest, access_token: Option<&str>) -> SessionResult<ApiResponse> {
        let url = self.config.url(&request.path);
        debug!(method = ?request.method, url = %url, "Sending request");

        let mut builder = self.client().request(request.method.into(), url);
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(store_id) = &request.store_id {
            builder = builder.header(STORE_HEADER, store_id);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        read_response(response).await
    }

    async fn renew(&self) -> SessionResult<String> {
        let response = self
            .client()
            .post(self.config.refresh_url())
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let data: AccessTokenData = read_response(response).await?.error_for_status()?.data()?;
        Ok(data.access_token)
    }

    fn clear(&self) {
        let fresh = match build_client(&self.config) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Could not rebuild HTTP client, refresh cookie kept");
                return;
            }
        };
        match self.client.write() {
            Ok(mut client) => *client = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
    }
}

impl SessionClient {
    /// Starts a session against a live API.
    pub fn connect(config: SessionConfig, access_token: Option<String>) -> SessionResult<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(SessionClient::start(Arc::new(transport), access_token))
    }
}
