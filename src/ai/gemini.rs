use anyhow::{anyhow, Context};
use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{AiClient, ImagePayload, MEAL_PROMPT, RECIPE_PROMPT};
use crate::config::AiConfig;
use crate::nutrition::{NutritionInfo, Recipe};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Gemini `generateContent` client asking for JSON output.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn image_part(image: &ImagePayload) -> Part {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: image.content_type.clone(),
                data: Base64::encode_string(&image.body),
            },
        }
    }

    async fn generate_json<T: DeserializeOwned>(&self, parts: Vec<Part>) -> anyhow::Result<T> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.2,
            },
        };

        let response = self
            .client
            .post(self.url())
            .json(&request)
            .send()
            .await
            .context("ai request")?;

        let status = response.status();
        let text = response.text().await.context("read ai response")?;
        if !status.is_success() {
            error!(%status, "ai api error");
            let message = serde_json::from_str::<GenerateResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .map_or(text, |e| e.message);
            return Err(anyhow!("ai api error ({status}): {message}"));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text).context("parse ai envelope")?;
        let body = extract_text(parsed)?;
        debug!(len = body.len(), "ai response received");
        parse_model_json(&body)
    }
}

fn extract_text(response: GenerateResponse) -> anyhow::Result<String> {
    if let Some(e) = response.error {
        return Err(anyhow!("ai api error: {}", e.message));
    }
    response
        .candidates
        .into_iter()
        .flatten()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| match p {
            Part::Text { text } => Some(text),
            Part::InlineData { .. } => None,
        })
        .ok_or_else(|| anyhow!("no text content in ai response"))
}

/// Parses model output, tolerating a surrounding markdown code fence.
fn parse_model_json<T: DeserializeOwned>(raw: &str) -> anyhow::Result<T> {
    let trimmed = raw.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(unfenced.trim()).context("model returned unexpected json")
}

#[async_trait]
impl AiClient for GeminiClient {
    #[instrument(skip(self, image), fields(model = %self.model, content_type = %image.content_type))]
    async fn analyze_meal_photo(&self, image: &ImagePayload) -> anyhow::Result<NutritionInfo> {
        self.generate_json(vec![
            Part::Text {
                text: MEAL_PROMPT.to_string(),
            },
            Self::image_part(image),
        ])
        .await
    }

    #[instrument(skip(self, image), fields(model = %self.model))]
    async fn suggest_recipe(
        &self,
        pantry_items: &[String],
        image: Option<&ImagePayload>,
    ) -> anyhow::Result<Recipe> {
        let mut text = RECIPE_PROMPT.to_string();
        if !pantry_items.is_empty() {
            text.push_str("\nPantry items: ");
            text.push_str(&pantry_items.join(", "));
        }
        let mut parts = vec![Part::Text { text }];
        if let Some(image) = image {
            parts.push(Self::image_part(image));
        }
        self.generate_json(parts).await
    }
}
