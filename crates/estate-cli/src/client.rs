use anyhow::{Context, Result};
use estate_common::models::auth::{Credentials, LoginResponse, User};
use estate_common::models::property::{
    CreatePropertyRequest, ListingQuery, MessageResponse, Property, PropertyDetail,
    UpdatePropertyRequest, UploadResponse,
};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// HTTP client for the listing API
#[derive(Clone)]
pub struct ListingClient {
    client: reqwest::Client,
    base_url: Arc<str>,
    token: Option<Arc<str>>,
}

impl ListingClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Arc::from(base_url.trim_end_matches('/')),
            token: token.map(Arc::from),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Attach `Authorization: Bearer <token>`, failing early when there is no token
    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self
            .token
            .as_ref()
            .context("Not logged in: pass --token or set ESTATE_TOKEN")?;
        Ok(request.header("Authorization", format!("Bearer {}", token)))
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&credentials(email, password))
            .send()
            .await
            .context("Failed to send register request")?;
        parse(response, "Register").await
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&credentials(email, password))
            .send()
            .await
            .context("Failed to send login request")?;
        parse(response, "Login").await
    }

    /// Public listing search, newest first
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, query: &ListingQuery) -> Result<Vec<Property>> {
        let response = self
            .client
            .get(self.url("/properties"))
            .query(query)
            .send()
            .await
            .context("Failed to send list request")?;
        parse(response, "List").await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<PropertyDetail> {
        let response = self
            .client
            .get(self.url(&format!("/properties/{}", id)))
            .send()
            .await
            .context("Failed to send get request")?;
        parse(response, "Get").await
    }

    #[tracing::instrument(skip(self))]
    pub async fn mine(&self) -> Result<Vec<Property>> {
        let response = self
            .authed(self.client.get(self.url("/properties/my")))?
            .send()
            .await
            .context("Failed to send request")?;
        parse(response, "Listing own properties").await
    }

    #[tracing::instrument(skip(self, req))]
    pub async fn create(&self, req: &CreatePropertyRequest) -> Result<Property> {
        let response = self
            .authed(self.client.post(self.url("/properties")))?
            .json(req)
            .send()
            .await
            .context("Failed to send create request")?;
        parse(response, "Create").await
    }

    #[tracing::instrument(skip(self, req))]
    pub async fn update(&self, id: Uuid, req: &UpdatePropertyRequest) -> Result<Property> {
        let response = self
            .authed(self.client.put(self.url(&format!("/properties/{}", id))))?
            .json(req)
            .send()
            .await
            .context("Failed to send update request")?;
        parse(response, "Update").await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<String> {
        let response = self
            .authed(self.client.delete(self.url(&format!("/properties/{}", id))))?
            .send()
            .await
            .context("Failed to send delete request")?;
        let body: MessageResponse = parse(response, "Delete").await?;
        Ok(body.message)
    }

    /// Upload one image as multipart field `image`; returns the hosted URL
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .context("Invalid content type")?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .authed(self.client.post(self.url("/properties/upload")))?
            .multipart(form)
            .send()
            .await
            .context("Failed to send upload request")?;
        let body: UploadResponse = parse(response, "Upload").await?;
        Ok(body.image_url)
    }
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

/// Decode a success body, or turn an error body into a readable failure
async fn parse<T: DeserializeOwned>(response: Response, action: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read body".to_string());
        anyhow::bail!(
            "{} failed with status {}: {}",
            action,
            status,
            error_message(&body)
        );
    }
    response
        .json()
        .await
        .with_context(|| format!("Failed to parse {} response", action.to_lowercase()))
}

/// `message` plus `error` detail from a JSON error body, or the raw body
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    let message = value.get("message").and_then(|v| v.as_str());
    let detail = value.get("error").and_then(|v| v.as_str());
    match (message, detail) {
        (Some(m), Some(d)) => format!("{} ({})", m, d),
        (Some(m), None) => m.to_string(),
        _ => body.to_string(),
    }
}
