//! HTTP clients for the object store and the function service.
//!
//! # Responsibilities
//! - Fetch route table blobs with `GET <base>/<path>`
//! - Invoke functions with
//!   `POST <base>/<api_version>/services/<service>/functions/<function>/invocations`
//! - Map HTTP statuses onto [`FetchError`] / [`InvokeError`]
//!
//! # Design Decisions
//! - One shared `reqwest::Client` per capability (connection pooling)
//! - Optional client-side timeout; none by default
//! - Path pieces are percent-encoded through `url` segment APIs

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client, StatusCode};
use thiserror::Error;
use url::Url;

use crate::backend::{FetchError, FunctionInvoke, InvokeError, ObjectFetch};

/// Header set by the function service when the function itself failed.
pub const FUNCTION_ERROR_HEADER: &str = "x-fc-error-type";

/// Errors building an HTTP capability client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid endpoint URL '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("endpoint URL '{0}' cannot carry a path")]
    NotABase(String),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

fn parse_base(base_url: &str) -> Result<Url, ClientError> {
    let url = Url::parse(base_url).map_err(|source| ClientError::Url {
        url: base_url.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientError::NotABase(base_url.to_string()));
    }
    Ok(url)
}

fn build_client(timeout: Option<Duration>) -> Result<Client, ClientError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Append `segments` to the path of `base`.
fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty()
            .extend(segments.into_iter().filter(|s| !s.is_empty()));
    }
    url
}

/// Object store reachable over plain HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: Client,
    base: Url,
}

impl HttpObjectStore {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(timeout)?,
            base: parse_base(base_url)?,
        })
    }

    /// URL an object key resolves to.
    pub fn object_url(&self, path: &str) -> Url {
        join_segments(&self.base, path.split('/'))
    }
}

#[async_trait]
impl ObjectFetch for HttpObjectStore {
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
        let url = self.object_url(path);
        tracing::debug!(url = %url, "Fetching object");

        let response = self.client.get(url).send().await?;
        match response.status() {
            status if status.is_success() => Ok(response.bytes().await?),
            StatusCode::NOT_FOUND => Err(FetchError::NotFound(path.to_string())),
            status => Err(FetchError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            }),
        }
    }
}

/// Function service client.
#[derive(Debug, Clone)]
pub struct HttpFunctionInvoker {
    client: Client,
    base: Url,
    api_version: String,
}

impl HttpFunctionInvoker {
    pub fn new(
        base_url: &str,
        api_version: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(timeout)?,
            base: parse_base(base_url)?,
            api_version: api_version.into(),
        })
    }

    /// URL a `(service, function)` invocation is posted to.
    pub fn invocation_url(&self, service: &str, function: &str) -> Url {
        join_segments(
            &self.base,
            [
                self.api_version.as_str(),
                "services",
                service,
                "functions",
                function,
                "invocations",
            ],
        )
    }
}

#[async_trait]
impl FunctionInvoke for HttpFunctionInvoker {
    async fn invoke(
        &self,
        service: &str,
        function: &str,
        payload: Bytes,
    ) -> Result<Bytes, InvokeError> {
        let url = self.invocation_url(service, function);
        tracing::debug!(url = %url, service = %service, function = %function, "Invoking function");

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let function_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(InvokeError::Status {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        if let Some(kind) = function_error {
            return Err(InvokeError::Function {
                kind,
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_appends_key_segments() {
        let store = HttpObjectStore::new("https://bucket.oss.example.com", None).unwrap();
        assert_eq!(
            store.object_url("qi/router.json").as_str(),
            "https://bucket.oss.example.com/qi/router.json"
        );
        assert_eq!(
            store.object_url("/qi/router.json").as_str(),
            "https://bucket.oss.example.com/qi/router.json"
        );
    }

    #[test]
    fn test_object_url_keeps_base_path() {
        let store = HttpObjectStore::new("http://127.0.0.1:9000/bucket/", None).unwrap();
        assert_eq!(
            store.object_url("router.json").as_str(),
            "http://127.0.0.1:9000/bucket/router.json"
        );
    }

    #[test]
    fn test_invocation_url_layout() {
        let invoker =
            HttpFunctionInvoker::new("https://123.fc.example.com", "2016-08-15", None).unwrap();
        assert_eq!(
            invoker.invocation_url("s1", "f1").as_str(),
            "https://123.fc.example.com/2016-08-15/services/s1/functions/f1/invocations"
        );
    }

    #[test]
    fn test_invocation_url_encodes_names() {
        let invoker = HttpFunctionInvoker::new("http://localhost:9000", "v1", None).unwrap();
        assert_eq!(
            invoker.invocation_url("my svc", "f/1").as_str(),
            "http://localhost:9000/v1/services/my%20svc/functions/f%2F1/invocations"
        );
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(matches!(
            HttpObjectStore::new("not a url", None),
            Err(ClientError::Url { .. })
        ));
        assert!(matches!(
            HttpFunctionInvoker::new("mailto:ops@example.com", "v1", None),
            Err(ClientError::NotABase(_))
        ));
    }
}
