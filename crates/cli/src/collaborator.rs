use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine as _;
use pagesmith_orchestrator::CollaboratorSettings;
use pagesmith_protocol::{Collaborator, CollaboratorError, Completion, ImageRef, Prompt};
use reqwest::Client;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;

/// OpenAI-compatible chat-completions client. `base_url` includes the version
/// segment, e.g. `https://api.openai.com/v1`.
pub struct HttpCollaborator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
}

impl HttpCollaborator {
    pub fn from_settings(settings: &CollaboratorSettings) -> Result<Self> {
        let base_url = settings
            .base_url
            .as_deref()
            .context("collaborator.base_url is not set")?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        let api_key = std::env::var(&settings.api_key_env).ok();
        if api_key.is_none() {
            log::warn!("{} is not set; sending requests without a key", settings.api_key_env);
        }

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            api_key,
            max_tokens: settings.max_tokens,
        })
    }

    fn request_body(&self, prompt: &Prompt) -> Value {
        let user = if prompt.images.is_empty() {
            json!(prompt.user)
        } else {
            let mut parts = vec![json!({ "type": "text", "text": prompt.user })];
            parts.extend(prompt.images.iter().map(|image| {
                json!({ "type": "image_url", "image_url": { "url": image.url } })
            }));
            Value::Array(parts)
        };

        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": user },
            ],
        })
    }
}

#[async_trait]
impl Collaborator for HttpCollaborator {
    async fn complete(&self, prompt: &Prompt) -> Result<Completion, CollaboratorError> {
        let mut request = self.client.post(&self.endpoint).json(&self.request_body(prompt));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| CollaboratorError::Transport(format!("POST {}: {err}", self.endpoint)))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Transport(format!("API error ({status}): {body}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| CollaboratorError::Malformed(err.to_string()))?;
        let choice = &body["choices"][0];
        let text = choice["message"]["content"]
            .as_str()
            .ok_or_else(|| CollaboratorError::Malformed("no message content".to_string()))?;
        let truncated = choice["finish_reason"].as_str() == Some("length");
        log::debug!("completion: {} chars, truncated={truncated}", text.len());

        Ok(Completion {
            text: text.to_string(),
            truncated,
        })
    }
}

/// Read an image file into a `data:` URL reference.
pub fn load_image(path: &Path) -> Result<ImageRef> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("avif") => "image/avif",
        _ => "image/png",
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

    Ok(ImageRef {
        name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        url: format!("data:{mime};base64,{encoded}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collaborator() -> HttpCollaborator {
        HttpCollaborator::from_settings(&CollaboratorSettings {
            base_url: Some("http://localhost:8080/v1/".to_string()),
            ..CollaboratorSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoint_joins_base_url() {
        assert_eq!(collaborator().endpoint, "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn images_become_content_parts() {
        let prompt = Prompt::new("sys", "make this").with_images(vec![ImageRef {
            name: "shot.png".into(),
            url: "data:image/png;base64,AAAA".into(),
        }]);
        let body = collaborator().request_body(&prompt);
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["content"][0]["text"], "make this");
        assert_eq!(
            body["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn load_image_builds_data_url() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logo.JPG");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.name, "logo.JPG");
        assert_eq!(image.url, "data:image/jpeg;base64,AQID");
    }
}
