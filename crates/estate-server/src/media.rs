use crate::config::MediaConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// An image received from a client, held in memory
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Encode as `data:<mime>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Third-party image hosting. Returns the public URL of the stored image.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<String>;
}

/// Cloudinary signed-upload client
pub struct CloudinaryHost {
    client: reqwest::Client,
    config: MediaConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResult {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    error: UploadErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UploadErrorDetail {
    message: String,
}

impl CloudinaryHost {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }
}

/// Sign the upload parameters: `key=value` pairs sorted by key, joined with
/// `&`, followed by the API secret, hashed with SHA-256.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    #[tracing::instrument(skip(self, image), fields(content_type = %image.content_type, size = image.bytes.len()))]
    async fn upload(&self, image: ImageUpload) -> Result<String> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signed = [
            ("folder", self.config.folder.clone()),
            ("timestamp", timestamp),
        ];
        let signature = sign_params(&signed, &self.config.api_secret);

        let mut form: Vec<(&str, String)> = signed.to_vec();
        form.push(("file", image.to_data_uri()));
        form.push(("api_key", self.config.api_key.clone()));
        form.push(("signature", signature));
        form.push(("signature_algorithm", "sha256".to_string()));

        let response = self
            .client
            .post(self.upload_url())
            .form(&form)
            .send()
            .await
            .context("Failed to reach image host")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read image host response")?;

        if !status.is_success() {
            let message = serde_json::from_str::<UploadErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            anyhow::bail!("{}", message);
        }

        let result: UploadResult =
            serde_json::from_str(&body).context("Failed to parse image host response")?;
        tracing::debug!("Image uploaded to {}", result.secure_url);
        Ok(result.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Form, http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn media_config(base_url: String) -> MediaConfig {
        MediaConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            folder: "property_images".to_string(),
            base_url,
        }
    }

    /// Serve a stand-in for the hosting API on an ephemeral port
    async fn spawn_host(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_data_uri() {
        let image = ImageUpload {
            content_type: "image/png".to_string(),
            bytes: b"hello".to_vec(),
        };
        assert_eq!(image.to_data_uri(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_sign_params_sorted_and_deterministic() {
        let a = sign_params(
            &[("timestamp", "1".to_string()), ("folder", "f".to_string())],
            "s",
        );
        let b = sign_params(
            &[("folder", "f".to_string()), ("timestamp", "1".to_string())],
            "s",
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let mut hasher = Sha256::new();
        hasher.update(b"folder=f&timestamp=1s");
        assert_eq!(a, format!("{:x}", hasher.finalize()));
    }

    #[tokio::test]
    async fn test_upload_returns_secure_url() {
        let router = Router::new().route(
            "/demo/image/upload",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                assert_eq!(form["folder"], "property_images");
                assert_eq!(form["api_key"], "key");
                assert!(form["file"].starts_with("data:image/jpeg;base64,"));
                let expected = sign_params(
                    &[
                        ("folder", form["folder"].clone()),
                        ("timestamp", form["timestamp"].clone()),
                    ],
                    "secret",
                );
                assert_eq!(form["signature"], expected);
                Json(json!({"secure_url": "https://cdn.example/abc.jpg"}))
            }),
        );
        let base_url = spawn_host(router).await;
        let host = CloudinaryHost::new(media_config(base_url));

        let url = host
            .upload(ImageUpload {
                content_type: "image/jpeg".to_string(),
                bytes: vec![0xff, 0xd8, 0xff],
            })
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example/abc.jpg");
    }

    #[tokio::test]
    async fn test_upload_surfaces_downstream_message() {
        let router = Router::new().route(
            "/demo/image/upload",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "Invalid Signature"}})),
                )
            }),
        );
        let base_url = spawn_host(router).await;
        let host = CloudinaryHost::new(media_config(base_url));

        let err = host
            .upload(ImageUpload {
                content_type: "image/png".to_string(),
                bytes: vec![1, 2, 3],
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid Signature");
    }

    #[tokio::test]
    async fn test_upload_unreachable_host() {
        let host = CloudinaryHost::new(media_config("http://127.0.0.1:1".to_string()));
        let err = host
            .upload(ImageUpload {
                content_type: "image/png".to_string(),
                bytes: vec![1],
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to reach image host"));
    }
}
