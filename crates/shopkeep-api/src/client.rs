// GraphQL HTTP client
//
// Wraps `reqwest::Client` with the `{operationName, query, variables}`
// request shape and `{data, errors}` response envelope. The client holds
// no credentials: callers pass the bearer token per request, so a single
// instance can serve both anonymous (register/login) and authenticated
// operations. Typed operations live in `users.rs`, `products.rs` and
// `auth.rs` as inherent methods.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    operation_name: &'a str,
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Deserialize)]
struct GraphQlErrorExtensions {
    code: Option<String>,
}

/// Raw client for the backend's GraphQL endpoint.
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl GraphQlClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `endpoint` is the full GraphQL URL, e.g. `http://localhost:8080/query`.
    pub fn new(endpoint: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            endpoint,
            timeout: transport.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoint: Url) -> Self {
        Self {
            http,
            endpoint,
            timeout: TransportConfig::default().timeout,
        }
    }

    /// The GraphQL endpoint this client posts to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Execute one GraphQL operation and decode its `data` payload.
    ///
    /// A token, when given, is sent as `Authorization: Bearer <token>`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        operation_name: &str,
        query: &str,
        variables: serde_json::Value,
        token: Option<&SecretString>,
    ) -> Result<T, Error> {
        debug!(operation = operation_name, "POST {}", self.endpoint);

        let body = GraphQlRequest {
            operation_name,
            query,
            variables,
        };

        let mut builder = self.http.post(self.endpoint.clone()).json(&body);
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let resp = builder.send().await.map_err(|e| self.map_send_error(e))?;

        self.parse_response(resp).await
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Map HTTP status, then the `errors` array, then decode `data`.
    async fn parse_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            let body = resp.text().await.unwrap_or_default();
            let message = body.trim();
            return Err(Error::Authentication {
                message: if message.is_empty() {
                    "token missing or rejected".into()
                } else {
                    message.to_owned()
                },
            });
        }

        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;
        trace!(status = status.as_u16(), bytes = body.len(), "response received");

        if !status.is_success() {
            // gqlgen reports GraphQL errors with a 422; prefer the structured payload.
            if let Ok(envelope) =
                serde_json::from_str::<GraphQlResponse<serde_json::Value>>(&body)
            {
                if let Some(err) = envelope.errors.into_iter().next() {
                    return Err(into_graphql_error(err));
                }
            }
            return Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let envelope: GraphQlResponse<T> = serde_json::from_str(&body).map_err(|e| {
            Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            }
        })?;

        if let Some(err) = envelope.errors.into_iter().next() {
            return Err(into_graphql_error(err));
        }

        envelope.data.ok_or_else(|| Error::Deserialization {
            message: "response carried neither data nor errors".into(),
            body,
        })
    }
}

fn into_graphql_error(err: GraphQlError) -> Error {
    Error::GraphQl {
        message: err.message,
        code: err.extensions.and_then(|ext| ext.code),
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
