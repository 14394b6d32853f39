use crate::{
    error::ApiError,
    session::{MemoryTokenStore, TokenStore},
};
use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use std::{sync::Arc, time::Duration};

/// Default API root when `API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

const TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client bound to one API root.
///
/// Every request carries the stored access token as a bearer header. Cloning
/// is cheap and clones share the token store.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_store(base_url, Arc::new(MemoryTokenStore::default()))
    }

    pub fn with_store(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        let http = Client::builder()
            .timeout(TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to the default HTTP client: {e}");
                Client::new()
            });

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Reads `API_URL`, falling back to [`DEFAULT_API_URL`]
    pub fn from_env() -> Self {
        Self::new(std::env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{method} {url}");

        let builder = self.http.request(method, url);
        match self.tokens.access() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|e| {
            warn!("Request failed before a response: {e}");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status, &body);
        warn!("{err}");
        Err(err)
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::json(response).await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        Self::json(response).await
    }

    /// Raw body of a download such as the PDF report
    pub async fn get_bytes<Q>(&self, path: &str, query: &Q) -> Result<Vec<u8>, ApiError>
    where
        Q: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        Self::json(response).await
    }

    /// POST without a body, for action endpoints like cancel
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::POST, path)).await?;
        Self::json(response).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::PATCH, path).json(body))
            .await?;
        Self::json(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}
