//! Text-to-image generation client.
//!
//! Thin I/O glue around two provider request shapes: an OpenAI-style images
//! endpoint that answers with a download URL, and a Gemini/Imagen-style
//! endpoint that answers with an inline base64 payload. Either way the result
//! is raw image bytes written to a file, optionally post-processed by the
//! cleanup engine.
//!
//! No retry, no backoff: a failed generation is reported and the batch moves
//! on to the next sprite.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;

use crate::engine::{CleanupEngine, ProcessOptions};
use crate::error::{Error, Result};

/// Default OpenAI images endpoint.
const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";
/// Default Gemini Imagen predict endpoint.
const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/imagen-4.0-generate-001:predict";
/// Request timeout for generation calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Which external generation API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// OpenAI images endpoint; the response carries a download URL.
    OpenAi,
    /// Gemini Imagen predict endpoint; the response carries inline base64.
    Gemini,
}

impl Provider {
    /// Environment variable holding this provider's API key.
    #[must_use]
    pub fn env_key(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    fn default_endpoint(self) -> &'static str {
        match self {
            Self::OpenAi => OPENAI_ENDPOINT,
            Self::Gemini => GEMINI_ENDPOINT,
        }
    }
}

/// Sampling parameters shared by every request in a batch.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Style prefix prepended to every prompt. Empty disables the prefix.
    pub base_style: String,
    /// Model name sent to the OpenAI endpoint.
    pub model: String,
    /// Image size requested from the OpenAI endpoint.
    pub size: String,
    /// Quality tier requested from the OpenAI endpoint.
    pub quality: String,
    /// Sample count requested from the Imagen endpoint.
    pub sample_count: u32,
    /// Aspect ratio requested from the Imagen endpoint, if any.
    pub aspect_ratio: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            base_style: "cute pixel art creature, 64x64 pixels, pastel colors, big eyes, \
                         isolated on transparent background, game sprite asset, \
                         single character only"
                .to_string(),
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
            sample_count: 1,
            aspect_ratio: None,
        }
    }
}

/// One manifest entry: a sprite name and its prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct SpriteSpec {
    /// Output file name (without extension).
    pub name: String,
    /// Prompt text, appended to the base style.
    pub prompt: String,
}

/// Batch driver behavior.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory the generated sprites are written to.
    pub out_dir: PathBuf,
    /// Regenerate sprites whose output file already exists.
    pub force: bool,
    /// Dispatch requests in parallel (one task per sprite) instead of
    /// sequentially.
    pub parallel: bool,
    /// Pause between sequential requests, to stay under provider rate
    /// limits. Ignored in parallel mode.
    pub delay: Duration,
}

/// Result of generating a single sprite.
#[derive(Debug)]
pub struct GenerationOutcome {
    /// Sprite name from the manifest.
    pub name: String,
    /// Output file path.
    pub path: PathBuf,
    /// Whether the sprite was generated and saved.
    pub success: bool,
    /// Whether generation was skipped (file already exists).
    pub skipped: bool,
    /// Human-readable status message.
    pub message: String,
}

/// Decoded payload of a generation response.
enum ImagePayload {
    /// The API answered with a URL to download.
    Url(String),
    /// The API answered with inline image bytes.
    Bytes(Vec<u8>),
}

/// Client for a single generation provider.
///
/// Create once and reuse for a whole batch; the underlying HTTP client pools
/// connections.
#[derive(Debug)]
pub struct GenerationClient {
    http: reqwest::blocking::Client,
    provider: Provider,
    endpoint: String,
    api_key: String,
}

impl GenerationClient {
    /// Create a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be constructed.
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            provider,
            endpoint: provider.default_endpoint().to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a client reading the API key from the provider's environment
    /// variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] if the variable is unset or
    /// empty.
    pub fn from_env(provider: Provider) -> Result<Self> {
        let key = std::env::var(provider.env_key())
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingCredential(provider.env_key()))?;
        Self::new(provider, key)
    }

    /// Override the endpoint URL (for proxies or compatible services).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Generate one image and return its raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure, [`Error::Api`] on a
    /// non-success status, [`Error::MissingImageData`] when the response
    /// carries no payload, and [`Error::Base64`] on a bad inline payload.
    pub fn generate(&self, prompt: &str, opts: &GenerationOptions) -> Result<Vec<u8>> {
        let full_prompt = if opts.base_style.is_empty() {
            prompt.to_string()
        } else {
            format!("{}, {}", opts.base_style, prompt)
        };
        log::debug!("requesting image for prompt: {full_prompt}");

        let request = match self.provider {
            Provider::OpenAi => self
                .http
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&serde_json::json!({
                    "model": opts.model,
                    "prompt": full_prompt,
                    "n": 1,
                    "size": opts.size,
                    "quality": opts.quality,
                    "response_format": "url",
                })),
            Provider::Gemini => {
                let mut parameters = serde_json::json!({ "sampleCount": opts.sample_count });
                if let Some(ratio) = &opts.aspect_ratio {
                    parameters["aspectRatio"] = serde_json::Value::String(ratio.clone());
                }
                self.http
                    .post(&self.endpoint)
                    .header("x-goog-api-key", &self.api_key)
                    .json(&serde_json::json!({
                        "instances": [{ "prompt": full_prompt }],
                        "parameters": parameters,
                    }))
            }
        };

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        let payload = match self.provider {
            Provider::OpenAi => parse_openai(&body)?,
            Provider::Gemini => parse_imagen(&body)?,
        };

        match payload {
            ImagePayload::Bytes(bytes) => Ok(bytes),
            ImagePayload::Url(url) => {
                log::debug!("downloading generated image from {url}");
                let bytes = self.http.get(url).send()?.error_for_status()?.bytes()?;
                Ok(bytes.to_vec())
            }
        }
    }

    /// Generate one image and write it to `path`, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Propagates [`GenerationClient::generate`] errors plus [`Error::Io`]
    /// on write failure.
    pub fn generate_to_file(
        &self,
        prompt: &str,
        opts: &GenerationOptions,
        path: &Path,
    ) -> Result<()> {
        let bytes = self.generate(prompt, opts)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Generate a batch of sprites, skipping existing files unless forced.
    ///
    /// With `cleanup` set, every freshly written sprite is run through the
    /// cleanup engine in place. Individual failures are captured in the
    /// returned outcomes; the batch always runs to completion.
    #[must_use]
    pub fn generate_batch(
        &self,
        specs: &[SpriteSpec],
        opts: &GenerationOptions,
        batch: &BatchOptions,
        cleanup: Option<&CleanupEngine>,
    ) -> Vec<GenerationOutcome> {
        let job = |spec: &SpriteSpec| self.generate_one(spec, opts, batch, cleanup);

        #[cfg(feature = "cli")]
        if batch.parallel {
            use rayon::prelude::*;
            return specs.par_iter().map(job).collect();
        }

        let mut outcomes = Vec::with_capacity(specs.len());
        for spec in specs {
            let outcome = job(spec);
            let generated = !outcome.skipped;
            outcomes.push(outcome);
            if generated && !batch.delay.is_zero() {
                std::thread::sleep(batch.delay);
            }
        }
        outcomes
    }

    fn generate_one(
        &self,
        spec: &SpriteSpec,
        opts: &GenerationOptions,
        batch: &BatchOptions,
        cleanup: Option<&CleanupEngine>,
    ) -> GenerationOutcome {
        let path = batch.out_dir.join(format!("{}.png", spec.name));
        let mut outcome = GenerationOutcome {
            name: spec.name.clone(),
            path: path.clone(),
            success: false,
            skipped: false,
            message: String::new(),
        };

        if !batch.force && path.exists() {
            outcome.success = true;
            outcome.skipped = true;
            outcome.message = "Already exists, skipped".to_string();
            return outcome;
        }

        if let Err(e) = self.generate_to_file(&spec.prompt, opts, &path) {
            outcome.message = format!("Generation failed: {e}");
            return outcome;
        }

        outcome.success = true;
        outcome.message = "Generated".to_string();

        if let Some(engine) = cleanup {
            let result = engine.process_file(&path, &path, &ProcessOptions::default());
            if result.success {
                outcome.message = format!("Generated, cleaned ({} pixels removed)", result.removed);
            } else {
                outcome.message = format!("Generated, cleanup failed: {}", result.message);
            }
        }

        outcome
    }
}

/// Load a manifest of sprite specs from a JSON file (an array of
/// `{"name": ..., "prompt": ...}` objects).
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Json`] if
/// it is not a valid manifest.
pub fn load_manifest(path: &Path) -> Result<Vec<SpriteSpec>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[derive(Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiImage>,
}

#[derive(Deserialize)]
struct OpenAiImage {
    url: Option<String>,
    b64_json: Option<String>,
}

#[derive(Deserialize)]
struct ImagenResponse {
    #[serde(default)]
    predictions: Vec<ImagenPrediction>,
}

#[derive(Deserialize)]
struct ImagenPrediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
}

fn parse_openai(body: &str) -> Result<ImagePayload> {
    let response: OpenAiResponse = serde_json::from_str(body)?;
    let image = response.data.into_iter().next().ok_or(Error::MissingImageData)?;
    if let Some(url) = image.url {
        return Ok(ImagePayload::Url(url));
    }
    if let Some(b64) = image.b64_json {
        return Ok(ImagePayload::Bytes(BASE64.decode(b64)?));
    }
    Err(Error::MissingImageData)
}

fn parse_imagen(body: &str) -> Result<ImagePayload> {
    let response: ImagenResponse = serde_json::from_str(body)?;
    let b64 = response
        .predictions
        .into_iter()
        .next()
        .and_then(|p| p.bytes_base64_encoded)
        .ok_or(Error::MissingImageData)?;
    Ok(ImagePayload::Bytes(BASE64.decode(b64)?))
}

/// Map a non-success response to [`Error::Api`], pulling the provider's
/// error message out of the body when present.
fn api_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no response body".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        });
    Error::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imagen_response_decodes_inline_payload() {
        let body = r#"{"predictions":[{"bytesBase64Encoded":"aGVsbG8="}]}"#;
        match parse_imagen(body).unwrap() {
            ImagePayload::Bytes(bytes) => assert_eq!(bytes, b"hello"),
            ImagePayload::Url(_) => panic!("expected inline bytes"),
        }
    }

    #[test]
    fn imagen_response_without_predictions_is_missing_data() {
        let body = r#"{"predictions":[]}"#;
        assert!(matches!(
            parse_imagen(body),
            Err(Error::MissingImageData)
        ));

        let body = r#"{}"#;
        assert!(matches!(parse_imagen(body), Err(Error::MissingImageData)));
    }

    #[test]
    fn imagen_response_with_bad_base64_is_a_decode_error() {
        let body = r#"{"predictions":[{"bytesBase64Encoded":"not@@base64"}]}"#;
        assert!(matches!(parse_imagen(body), Err(Error::Base64(_))));
    }

    #[test]
    fn openai_response_yields_download_url() {
        let body = r#"{"data":[{"url":"https://example.com/img.png"}]}"#;
        match parse_openai(body).unwrap() {
            ImagePayload::Url(url) => assert_eq!(url, "https://example.com/img.png"),
            ImagePayload::Bytes(_) => panic!("expected a URL"),
        }
    }

    #[test]
    fn openai_response_supports_inline_payload() {
        let body = r#"{"data":[{"b64_json":"aGVsbG8="}]}"#;
        match parse_openai(body).unwrap() {
            ImagePayload::Bytes(bytes) => assert_eq!(bytes, b"hello"),
            ImagePayload::Url(_) => panic!("expected inline bytes"),
        }
    }

    #[test]
    fn openai_empty_data_is_missing_data() {
        let body = r#"{"data":[]}"#;
        assert!(matches!(parse_openai(body), Err(Error::MissingImageData)));
    }

    #[test]
    fn api_error_prefers_the_structured_message() {
        let err = api_error(429, r#"{"error":{"message":"rate limit exceeded"}}"#);
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limit exceeded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_the_raw_body() {
        let err = api_error(500, "internal server error");
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "internal server error");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = api_error(502, "   ");
        match err {
            Error::Api { message, .. } => assert_eq!(message, "no response body"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn manifest_parses_name_prompt_pairs() {
        let text = r#"[
            {"name": "golden-dragon", "prompt": "golden baby dragon, small wings"},
            {"name": "fire-egg", "prompt": "fire egg, orange with flame pattern"}
        ]"#;
        let specs: Vec<SpriteSpec> = serde_json::from_str(text).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "golden-dragon");
        assert!(specs[1].prompt.contains("flame"));
    }
}
