use anyhow::{anyhow, Context};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Thin HTTP client over the API's `{status, data}` envelope
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(server: &str) -> anyhow::Result<Self> {
        let base = Url::parse(server).with_context(|| format!("invalid server URL '{}'", server))?;
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    pub fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("cannot join '{}' onto {}", path, self.base))
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<Value> {
        let url = self.url(path)?;
        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        unwrap_envelope(response).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        let url = self.url(path)?;
        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;
        unwrap_envelope(response).await
    }
}

/// Return `data` on success, turn the error envelope into an error.
async fn unwrap_envelope(response: Response) -> anyhow::Result<Value> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("server answered {} with a non-JSON body", status))?;

    envelope_data(status.as_u16(), body)
}

pub(crate) fn envelope_data(status: u16, mut body: Value) -> anyhow::Result<Value> {
    if body.get("status").and_then(Value::as_str) == Some("success") {
        return Ok(body.get_mut("data").map(Value::take).unwrap_or(Value::Null));
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string();

    match body.get("field_errors").filter(|errors| !errors.is_null()) {
        Some(errors) => Err(anyhow!("{} ({}): {}", message, status, errors)),
        None => Err(anyhow!("{} ({})", message, status)),
    }
}
