//! hyper-backed [`Transport`] implementation.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use hyper::{Request, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use psearch_core::config::ServerConfig;
use psearch_core::{Headers, Method, Transport, TransportError};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const JSON: &str = "application/json";

/// Blocking JSON client for the search API.
pub struct HttpTransport {
    base_url: String,
    timeout: Duration,
    default_headers: Vec<(HeaderName, HeaderValue)>,
    client: Client<HttpConnector, Full<Bytes>>,
    runtime: tokio::runtime::Runtime,
}

impl HttpTransport {
    /// Client for `base_url` (e.g. `http://chef.local:4000/organizations/acme`).
    /// Request paths are appended verbatim, so a trailing `/` is dropped.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let uri: Uri = base_url
            .parse()
            .map_err(|e| TransportError::InvalidRequest(format!("{base_url}: {e}")))?;
        if uri.scheme_str() != Some("http") || uri.host().is_none() {
            return Err(TransportError::InvalidRequest(format!(
                "{base_url}: expected an http://host[:port] base URL"
            )));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Connect(format!("cannot start I/O runtime: {e}")))?;
        let client = Client::builder(TokioExecutor::new()).build_http();

        Ok(Self {
            base_url,
            timeout,
            default_headers: Vec::new(),
            client,
            runtime,
        })
    }

    /// Client configured from the `[server]` section.
    pub fn from_config(config: &ServerConfig) -> Result<Self, TransportError> {
        let mut transport =
            Self::new(&config.url, config.timeout())?.header(USER_AGENT.as_str(), &config.client_name)?;
        for (name, value) in &config.headers {
            transport = transport.header(name, value)?;
        }
        Ok(transport)
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, TransportError> {
        let name = HeaderName::try_from(name)
            .map_err(|e| TransportError::InvalidRequest(format!("header {name:?}: {e}")))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| TransportError::InvalidRequest(format!("header {name}: {e}")))?;
        self.default_headers.push((name, value));
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        headers: &Headers,
        payload: Option<&Value>,
    ) -> Result<Request<Full<Bytes>>, TransportError> {
        let uri = format!("{}{}", self.base_url, path);
        let body = match payload {
            Some(payload) => Bytes::from(serde_json::to_vec(payload)?),
            None => Bytes::new(),
        };

        let mut builder = Request::builder()
            .method(hyper_method(method))
            .uri(uri.as_str())
            .header(ACCEPT, JSON);
        if payload.is_some() {
            builder = builder.header(CONTENT_TYPE, JSON);
        }
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(Full::new(body))
            .map_err(|e| TransportError::InvalidRequest(format!("{method} {uri}: {e}")))
    }
}

impl Transport for HttpTransport {
    fn request(
        &self,
        method: Method,
        path: &str,
        headers: &Headers,
        payload: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let request = self.build_request(method, path, headers, payload)?;
        debug!(%method, base = %self.base_url, path, "sending request");

        let (status, body) = self.runtime.block_on(async {
            let response = tokio::time::timeout(self.timeout, self.client.request(request))
                .await
                .map_err(|_| TransportError::Timeout(self.timeout))?
                .map_err(|e| TransportError::Connect(error_chain(&e)))?;
            let status = response.status();
            let body = tokio::time::timeout(self.timeout, response.into_body().collect())
                .await
                .map_err(|_| TransportError::Timeout(self.timeout))?
                .map_err(|e| TransportError::Connect(error_chain(&e)))?
                .to_bytes();
            Ok::<_, TransportError>((status, body))
        })?;

        if !status.is_success() {
            warn!(%method, path, status = status.as_u16(), "request rejected by server");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        debug!(%method, path, status = status.as_u16(), bytes = body.len(), "response received");
        Ok(serde_json::from_slice(&body)?)
    }
}

fn hyper_method(method: Method) -> hyper::Method {
    match method {
        Method::Get => hyper::Method::GET,
        Method::Post => hyper::Method::POST,
    }
}

/// Joins the error with all of its sources as `outer: inner: root`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
