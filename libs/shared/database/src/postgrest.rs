use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Client for the relational store's PostgREST interface. The store is an
/// external collaborator; this client only speaks its REST conventions
/// (`?column=eq.value` filters, `Prefer: return=representation` on writes).
pub struct StoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StoreClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.store_url.clone(),
            api_key: config.store_api_key.clone(),
        }
    }

    fn get_headers(&self, returning: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.api_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key)).unwrap(),
        );

        if returning {
            headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        }

        headers
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        returning: bool,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Store request: {} {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.get_headers(returning));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Store authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                409 => anyhow!("Store conflict: {}", error_text),
                _ => anyhow!("Store error ({}): {}", status, error_text),
            });
        }

        Ok(response)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let returning = matches!(method, Method::POST | Method::PATCH | Method::PUT);
        let response = self.send(method, path, body, returning).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// GET rows matching a PostgREST query, e.g.
    /// `appointments?doctor_id=eq.<uuid>&order=scheduled_at.asc`.
    pub async fn select<T>(&self, query: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, &format!("/rest/v1/{}", query), None)
            .await
    }

    /// INSERT one row, returning the created representation.
    pub async fn insert<T>(&self, table: &str, row: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut created: Vec<T> = self
            .request(Method::POST, &format!("/rest/v1/{}", table), Some(row))
            .await?;

        created
            .pop()
            .ok_or_else(|| anyhow!("Store returned no representation for insert into {}", table))
    }

    /// PATCH rows matching a filtered query, returning the updated rows.
    /// An empty result means no row matched the filter.
    pub async fn update<T>(&self, query: &str, changes: Value) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, &format!("/rest/v1/{}", query), Some(changes))
            .await
    }

    /// DELETE rows matching a filtered query.
    pub async fn delete(&self, query: &str) -> Result<()> {
        self.send(Method::DELETE, &format!("/rest/v1/{}", query), None, false)
            .await?;
        Ok(())
    }
}
