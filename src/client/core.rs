// File: ./src/client/core.rs
use crate::client::DeadlineSource;
use crate::client::cert::NoVerifier;
use crate::client::middleware::DefaultHeadersLayer;
use crate::config::Config;
use crate::error::FetchError;
use crate::model::record::{DeadlineRecord, records_from_values};

use http::{HeaderValue, Method, Request, Response, Uri};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use tower_http::auth::AddAuthorization;
use tower_layer::Layer;

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;

pub fn user_agent() -> String {
    format!("deadlines/{}", env!("CARGO_PKG_VERSION"))
}

/// Client for the remote deadline store (`GET` returning a JSON array).
#[derive(Clone)]
pub struct RemoteClient {
    uri: Uri,
    http: HttpsClient,
    token: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("uri", &self.uri)
            .field("authenticated", &self.token.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteClient {
    pub fn new(
        url: &str,
        token: Option<&str>,
        insecure: bool,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        if url.trim().is_empty() {
            return Err(FetchError::Offline);
        }
        let uri: Uri = url
            .trim()
            .parse()
            .map_err(|e: http::uri::InvalidUri| FetchError::InvalidUrl(e.to_string()))?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(FetchError::InvalidUrl(format!("'{}' is not absolute", url)));
        }

        let token = token.map(str::trim).filter(|t| !t.is_empty());
        if let Some(t) = token
            && HeaderValue::from_str(&format!("Bearer {}", t)).is_err()
        {
            return Err(FetchError::InvalidUrl(
                "api token contains characters not allowed in a header".to_string(),
            ));
        }

        let tls_config_builder = rustls::ClientConfig::builder();
        let tls_config = if insecure {
            tls_config_builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoVerifier))
                .with_no_client_auth()
        } else {
            let mut root_store = rustls::RootCertStore::empty();
            let result = rustls_native_certs::load_native_certs();
            root_store.add_parsable_certificates(result.certs);
            if root_store.is_empty() && uri.scheme_str() == Some("https") {
                return Err(FetchError::Tls("No valid system certificates found.".to_string()));
            }
            tls_config_builder
                .with_root_certificates(root_store)
                .with_no_client_auth()
        };

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let http = Client::builder(TokioExecutor::new()).build(https_connector);
        Ok(Self {
            uri,
            http,
            token: token.map(str::to_string),
            timeout,
        })
    }

    /// Builds a client from the configuration; offline when no url is set.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            &config.remote_url,
            config.api_token.as_deref(),
            config.allow_insecure_certs,
            config.fetch_timeout(),
        )
    }

    async fn send(&self, req: Request<String>) -> Result<Response<Incoming>, FetchError> {
        let svc = DefaultHeadersLayer::json_client(&user_agent()).layer(self.http.clone());
        let result = match &self.token {
            Some(token) => AddAuthorization::bearer(svc, token).oneshot(req).await,
            None => svc.oneshot(req).await,
        };
        result.map_err(|e| FetchError::Transport(e.to_string()))
    }

    async fn fetch_inner(&self) -> Result<Vec<DeadlineRecord>, FetchError> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(self.uri.clone())
            .body(String::new())
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let response = self.send(req).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .to_bytes();
        decode_payload(&body)
    }

    /// Fetches every record, bounded by the configured timeout.
    pub async fn fetch_deadlines(&self) -> Result<Vec<DeadlineRecord>, FetchError> {
        log::debug!("Fetching remote deadlines from {}", self.uri);
        match tokio::time::timeout(self.timeout, self.fetch_inner()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout.as_secs())),
        }
    }
}

impl DeadlineSource for RemoteClient {
    async fn fetch_deadlines(&self) -> Result<Vec<DeadlineRecord>, FetchError> {
        RemoteClient::fetch_deadlines(self).await
    }
}

/// Decodes a response body. The payload must be a JSON array; array items
/// that are not records are skipped.
pub fn decode_payload(body: &[u8]) -> Result<Vec<DeadlineRecord>, FetchError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    match value {
        Value::Array(items) => Ok(records_from_values(items, "remote")),
        other => Err(FetchError::Malformed(format!(
            "expected a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_payload_requires_array() {
        assert_eq!(
            decode_payload(b"{\"error\": \"Unauthorized\"}"),
            Err(FetchError::Malformed(
                "expected a JSON array, got an object".to_string()
            ))
        );
        assert!(matches!(
            decode_payload(b"<html>"),
            Err(FetchError::Malformed(_))
        ));
        assert!(decode_payload(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_empty_url_is_offline() {
        assert_eq!(
            RemoteClient::new("  ", None, false, Duration::from_secs(1)).unwrap_err(),
            FetchError::Offline
        );
    }

    #[test]
    fn test_relative_url_is_rejected() {
        assert!(matches!(
            RemoteClient::new("/api/deadlines", None, false, Duration::from_secs(1)),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        assert!(matches!(
            RemoteClient::new(
                "http://localhost:1/api",
                Some("abc\ndef"),
                false,
                Duration::from_secs(1)
            ),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
