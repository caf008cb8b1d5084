use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::error::ApiError;
use crate::api::models::{Contact, Conversation, Message, Provider, SendMessage};

/// Header carrying the active provider id on every provider-scoped request.
pub const PROVIDER_HEADER: &str = "X-Chat-Provider";

/// The remote operations the session depends on.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    async fn providers(&self) -> Result<Vec<Provider>, ApiError>;
    async fn whoami(&self, provider: &str) -> Result<Contact, ApiError>;
    async fn contacts(&self, provider: &str) -> Result<Vec<Contact>, ApiError>;
    async fn conversations(&self, provider: &str) -> Result<Vec<Conversation>, ApiError>;
    async fn messages(&self, provider: &str, conversation_id: &str) -> Result<Vec<Message>, ApiError>;
    async fn send_message(&self, provider: &str, message: &SendMessage) -> Result<(), ApiError>;
}

pub struct ApiClient {
    http: HttpClient,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = crate::utils::normalize_url(base_url);
        Url::parse(&base_url)?;
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&joined)?)
    }

    fn with_provider(req: reqwest::RequestBuilder, provider: Option<&str>) -> reqwest::RequestBuilder {
        match provider {
            Some(p) => req.header(PROVIDER_HEADER, p),
            None => req,
        }
    }

    /// GET `path` and decode the JSON body.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        provider: Option<&str>,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        log::debug!("GET {url} provider={provider:?}");
        let req = Self::with_provider(self.http.get(url), provider).query(query);
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::from_status(resp.status().as_u16(), path));
        }
        Ok(resp.json::<T>().await?)
    }

    /// POST `payload` as JSON to `path`. The response body is ignored.
    pub async fn submit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        provider: Option<&str>,
        payload: &B,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        log::debug!("POST {url} provider={provider:?}");
        let req = Self::with_provider(self.http.post(url), provider).json(payload);
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::from_status(resp.status().as_u16(), path));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn providers(&self) -> Result<Vec<Provider>, ApiError> {
        self.fetch("/providers", None, &[]).await
    }

    async fn whoami(&self, provider: &str) -> Result<Contact, ApiError> {
        self.fetch("/whoami", Some(provider), &[]).await
    }

    async fn contacts(&self, provider: &str) -> Result<Vec<Contact>, ApiError> {
        self.fetch("/contacts", Some(provider), &[]).await
    }

    async fn conversations(&self, provider: &str) -> Result<Vec<Conversation>, ApiError> {
        self.fetch("/conversations", Some(provider), &[]).await
    }

    async fn messages(&self, provider: &str, conversation_id: &str) -> Result<Vec<Message>, ApiError> {
        self.fetch("/messages", Some(provider), &[("conversation_id", conversation_id)])
            .await
    }

    async fn send_message(&self, provider: &str, message: &SendMessage) -> Result<(), ApiError> {
        self.submit("/messages", Some(provider), message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_paths() {
        let client = ApiClient::new("localhost:8000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://localhost:8000/api/");
        assert_eq!(
            client.endpoint("/messages").unwrap().as_str(),
            "https://localhost:8000/api/messages"
        );
    }

    #[test]
    fn rejects_unparseable_base() {
        assert!(matches!(
            ApiClient::new("http://exa mple.com", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
