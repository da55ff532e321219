use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::app_config::ImageConfig;
use crate::errors::{AppError, ProviderError};
use crate::providers::ImageGenerator;

/// Leonardo client for the generations API
#[derive(Debug)]
pub struct Leonardo {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, without trailing slash
    endpoint: String,
    /// Model to generate with
    model_id: String,
    /// Things the images should avoid
    negative_prompt: String,
    width: u32,
    height: u32,
    /// Delay between status checks
    poll_interval: Duration,
    /// Status checks before giving up
    max_poll_attempts: u32,
}

/// Generation job request
#[derive(Debug, Serialize)]
pub struct GenerationRequest {
    /// Positive prompt
    pub prompt: String,

    /// The model to use
    #[serde(rename = "modelId")]
    pub model_id: String,

    /// Negative prompt
    #[serde(skip_serializing_if = "String::is_empty")]
    pub negative_prompt: String,

    pub width: u32,
    pub height: u32,

    /// Images per job
    pub num_images: u32,
}

/// Response to job creation
#[derive(Debug, Deserialize)]
pub struct CreateGenerationResponse {
    #[serde(rename = "sdGenerationJob")]
    pub job: GenerationJob,
}

/// Created job handle
#[derive(Debug, Deserialize)]
pub struct GenerationJob {
    #[serde(rename = "generationId")]
    pub generation_id: String,
}

/// Response to a status check
#[derive(Debug, Deserialize)]
pub struct GenerationStatusResponse {
    pub generations_by_pk: Option<GenerationStatus>,
}

/// Job state and output
#[derive(Debug, Deserialize)]
pub struct GenerationStatus {
    /// PENDING, COMPLETE or FAILED
    pub status: String,

    #[serde(default)]
    pub generated_images: Vec<GeneratedImage>,
}

/// One produced image
#[derive(Debug, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
}

impl Leonardo {
    /// Create a new Leonardo client
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            negative_prompt: config.negative_prompt.clone(),
            width: config.width,
            height: config.height,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            max_poll_attempts: config.max_poll_attempts,
        }
    }

    /// Start a generation job and return its id
    pub async fn create_generation(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerationRequest {
            prompt: prompt.to_string(),
            model_id: self.model_id.clone(),
            negative_prompt: self.negative_prompt.clone(),
            width: self.width,
            height: self.height,
            num_images: 1,
        };

        let response = self
            .client
            .post(format!("{}/generations", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let created: CreateGenerationResponse = Self::parse(response).await?;
        Ok(created.job.generation_id)
    }

    /// Poll the job until it completes, fails or runs out of attempts
    pub async fn wait_for_image_url(&self, generation_id: &str) -> Result<String, ProviderError> {
        for attempt in 1..=self.max_poll_attempts {
            debug!(
                "Checking generation {} (attempt {}/{})",
                generation_id, attempt, self.max_poll_attempts
            );

            let response = self
                .client
                .get(format!("{}/generations/{}", self.endpoint, generation_id))
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

            let status: GenerationStatusResponse = Self::parse(response).await?;
            let Some(generation) = status.generations_by_pk else {
                return Err(ProviderError::ParseError(format!(
                    "Generation {} not found",
                    generation_id
                )));
            };

            match generation.status.as_str() {
                "COMPLETE" => {
                    return generation
                        .generated_images
                        .into_iter()
                        .next()
                        .map(|image| image.url)
                        .ok_or_else(|| {
                            ProviderError::GenerationFailed("job completed without images".to_string())
                        });
                }
                "FAILED" => {
                    return Err(ProviderError::GenerationFailed(format!(
                        "generation {} failed",
                        generation_id
                    )));
                }
                other => debug!("Generation status: {}, waiting...", other),
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        Err(ProviderError::Timeout {
            attempts: self.max_poll_attempts,
        })
    }

    /// Download an image to `output_path`
    pub async fn download(&self, url: &str, output_path: &Path) -> Result<(), AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output_path, &bytes).await?;
        Ok(())
    }

    async fn check_status(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        error!("Leonardo API error ({}): {}", status, error_text);

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::AuthenticationError(error_text));
        }
        Err(ProviderError::ApiError {
            status_code: status.as_u16(),
            message: error_text,
        })
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        Self::check_status(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl ImageGenerator for Leonardo {
    async fn generate(&self, prompt: &str, output_path: &Path) -> Result<PathBuf, AppError> {
        if prompt.trim().is_empty() {
            warn!("Empty prompt, skipping image generation");
            return Err(ProviderError::EmptyPrompt.into());
        }

        let preview: String = prompt.chars().take(50).collect();
        info!("Creating generation job for prompt: {}...", preview);

        let generation_id = self.create_generation(prompt).await?;
        let url = self.wait_for_image_url(&generation_id).await?;
        self.download(&url, output_path).await?;

        info!("Image saved to {}", output_path.display());
        Ok(output_path.to_path_buf())
    }

    fn name(&self) -> &str {
        "leonardo"
    }
}
