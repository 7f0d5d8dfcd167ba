//! Executes `HttpRequest` values over the network with reqwest.
//!
//! The client keeps a cookie store so the backend's session cookie is sent
//! back on every call, the native counterpart of `credentials: "include"`.
//! There are no retries and no timeout; a transport failure is reported once
//! as [`ApiError::Transport`].

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::form::{FormData, FormValue};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
}

impl HttpTransport {
    /// # Errors
    /// Returns [`ApiError::Transport`] if the TLS backend cannot be
    /// initialised.
    pub fn new() -> Result<Self, ApiError> {
        let inner = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { inner })
    }

    /// Wrap an existing reqwest client, e.g. one sharing a cookie jar with
    /// a login flow.
    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Send `request` and collect the full response body.
    ///
    /// # Errors
    /// Returns [`ApiError::Transport`] on connection, protocol, or body-read
    /// errors. Non-2xx statuses are returned as data.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self.inner.request(to_method(request.method), &request.url);
        for (k, v) in &request.headers {
            builder = builder.header(k, v);
        }
        if let Some(form) = request.body {
            builder = builder.multipart(to_multipart(form)?);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(url = %request.url, error = %e, "request failed");
            ApiError::from(e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.text().await?;
        debug!(url = %request.url, status, "received response");

        Ok(HttpResponse { status, headers, body })
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
    }
}

fn to_multipart(form: FormData) -> Result<Form, ApiError> {
    let mut multipart = Form::new();
    for (name, value) in form.fields().iter().cloned() {
        multipart = match value {
            FormValue::Text(text) => multipart.text(name, text),
            FormValue::File(file) => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)?;
                multipart.part(name, part)
            }
        };
    }
    Ok(multipart)
}
