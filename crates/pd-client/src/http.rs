//! reqwest-backed transport shared by the typed endpoints

use crate::config::ClientConfig;
use crate::types::Page;
use crate::{Error, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const ACCEPT_V2: &str = "application/vnd.pagerduty+json;version=2";
const PAGE_LIMIT: u32 = 100;

/// Authenticated connection to the REST API.
///
/// Cheap to clone; clones share the underlying connection pool. The client is
/// read-only shared state: it holds no per-resource data.
#[derive(Clone, Debug)]
pub struct HttpClient {
    base_url: Url,
    token: Option<String>,
    http: Client,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            token: config.resolve_token(),
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        let response = self.execute(self.http.get(url).query(query)).await?;
        decode(response).await
    }

    pub(crate) async fn post<B, T>(&self, path: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        let response = self.execute(self.http.post(url).json(body)).await?;
        decode(response).await
    }

    pub(crate) async fn put<B, T>(&self, path: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "PUT");
        let response = self.execute(self.http.put(url).json(body)).await?;
        decode(response).await
    }

    pub(crate) async fn delete(&self, path: &[&str]) -> Result<()> {
        let url = self.url(path)?;
        tracing::debug!(%url, "DELETE");
        self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    /// Walk an offset-paginated listing and collect the `collection` array of every page.
    pub(crate) async fn list_all<T: DeserializeOwned>(
        &self,
        path: &[&str],
        collection: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut offset = 0u32;

        loop {
            let mut page_query = query.to_vec();
            page_query.push(("offset", offset.to_string()));
            page_query.push(("limit", PAGE_LIMIT.to_string()));

            let body: serde_json::Value = self.get(path, &page_query).await?;
            let page: Page = serde_json::from_value(body.clone())?;
            let batch: Vec<T> = match body.get(collection) {
                Some(values) => serde_json::from_value(values.clone())?,
                None => Vec::new(),
            };

            let fetched = batch.len() as u32;
            items.extend(batch);

            if !page.more || fetched == 0 {
                break;
            }
            offset += fetched;
        }

        Ok(items)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let mut builder = builder.header(ACCEPT, ACCEPT_V2);
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Token token={}", token));
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = parse_retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();
        let fallback = status.canonical_reason().unwrap_or("request failed");
        Err(api_error(status.as_u16(), &body, fallback, retry_after))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    errors: Vec<String>,
}

/// Turn a non-success response body into [`Error::Api`].
///
/// Bodies that are not the documented error envelope fall back to `fallback`.
fn api_error(status: u16, body: &str, fallback: &str, retry_after: Option<Duration>) -> Error {
    let (message, errors) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => {
            let message = match (error.message.is_empty(), error.code) {
                (true, _) => fallback.to_string(),
                (false, Some(code)) => format!("{} (code {})", error.message, code),
                (false, None) => error.message,
            };
            (message, error.errors)
        }
        Err(_) => (fallback.to_string(), Vec::new()),
    };

    let message = if errors.is_empty() {
        message
    } else {
        format!("{}: {}", message, errors.join(", "))
    };

    Error::Api {
        status,
        message,
        errors,
        retry_after,
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
