// HTTP inference collaborator: sends the punched-out PNG plus the instruction to
// an image model and decodes the picture it sends back.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::composite::EncodedImage;
use crate::error::InpaintError;
use crate::session::Inpainter;
use crate::types::Image;

const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-2.5-flash-image";

/// Environment variables checked for the key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Wrap the user's instruction in the fill-the-hole brief the model expects.
pub fn build_prompt(instruction: &str) -> String {
    format!(
        "You are a professional inpainting model.\n\
         The user has provided an image with a transparent area that needs to be filled.\n\
         Fill the transparent area following this instruction: \"{instruction}\".\n\
         It is crucial that you do not alter any of the non-transparent pixels of the original image.\n\
         Return only the complete image, without any transparency."
    )
}

// ---------------------------- wire format ----------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Content<'a>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: String },
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: [&'static str; 1],
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
struct ResponsePart {
    #[serde(default, rename = "inlineData", alias = "inline_data")]
    inline_data: Option<ResponseData>,
}

#[derive(Deserialize, Default)]
struct ResponseData {
    #[serde(default)]
    data: String,
}

fn request_body<'a>(payload: &'a EncodedImage, instruction: &str) -> GenerateRequest<'a> {
    GenerateRequest {
        contents: Content {
            parts: vec![
                RequestPart::Text {
                    text: build_prompt(instruction),
                },
                RequestPart::Image {
                    inline_data: InlineData {
                        mime_type: payload.mime_type(),
                        data: BASE64.encode(payload.bytes()),
                    },
                },
            ],
        },
        generation_config: GenerationConfig {
            response_modalities: ["IMAGE"],
        },
    }
}

/// Pull the first inline image out of a response body and decode it.
fn image_from_response(body: &str) -> Result<Image, InpaintError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| InpaintError::Http(format!("bad response: {e}")))?;
    let data = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.inline_data))
        .map(|d| d.data)
        .filter(|d| !d.is_empty())
        .ok_or(InpaintError::NoImage)?;

    let bytes = BASE64
        .decode(data.as_bytes())
        .map_err(|e| InpaintError::Decode(e.to_string()))?;
    image::load_from_memory(&bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| InpaintError::Decode(e.to_string()))
}

/// Map a non-success response to an error kind.
fn classify_failure(status: u16, body: &str) -> InpaintError {
    if body.contains("API key not valid") {
        InpaintError::InvalidApiKey
    } else {
        InpaintError::Http(format!("status {status}"))
    }
}

pub struct GeminiInpainter {
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl GeminiInpainter {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, InpaintError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InpaintError::Http(e.to_string()))?;
        Ok(Self { api_key, client })
    }

    /// Key from the environment. A missing key only fails once a request is made.
    pub fn from_env(timeout: Duration) -> Result<Self, InpaintError> {
        let key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .filter(|k| !k.trim().is_empty());
        if key.is_none() {
            tracing::warn!("no API key in the environment; edits will fail until one is set");
        }
        Self::new(key, timeout)
    }
}

impl Inpainter for GeminiInpainter {
    #[tracing::instrument(skip_all, fields(bytes = payload.bytes().len()))]
    fn inpaint(&self, payload: &EncodedImage, instruction: &str) -> Result<Image, InpaintError> {
        let key = self.api_key.as_deref().ok_or(InpaintError::MissingApiKey)?;
        let url = format!("{ENDPOINT}/{MODEL}:generateContent");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", key)
            .json(&request_body(payload, instruction))
            .send()
            .map_err(|e| InpaintError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| InpaintError::Http(e.to_string()))?;
        if !status.is_success() {
            let err = classify_failure(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), error = %err, "model call failed");
            return Err(err);
        }
        image_from_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn png_b64(img: &Image) -> String {
        BASE64.encode(EncodedImage::png(img).unwrap().bytes())
    }

    #[test]
    fn prompt_quotes_the_instruction() {
        let p = build_prompt("remove the red car");
        assert!(p.contains("\"remove the red car\""));
        assert!(p.contains("transparent"));
    }

    #[test]
    fn request_body_carries_text_then_png() {
        let payload = EncodedImage::png(&Image::new(2, 2)).unwrap();
        let json = serde_json::to_value(request_body(&payload, "fill")).unwrap();

        let parts = &json["contents"]["parts"];
        assert!(parts[0]["text"].as_str().unwrap().contains("fill"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        let data = parts[1]["inlineData"]["data"].as_str().unwrap();
        assert_eq!(BASE64.decode(data).unwrap(), payload.bytes());
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn response_image_is_decoded() {
        let img = Image::from_pixel(3, 2, Rgba([5, 6, 7, 255]));
        let body = format!(
            r#"{{"candidates":[{{"content":{{"parts":[{{"text":"here"}},{{"inlineData":{{"mimeType":"image/png","data":"{}"}}}}]}}}}]}}"#,
            png_b64(&img)
        );
        assert_eq!(image_from_response(&body).unwrap(), img);
    }

    #[test]
    fn response_without_image_is_no_image() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"sorry"}]}}]}"#;
        assert!(matches!(image_from_response(body), Err(InpaintError::NoImage)));
        assert!(matches!(image_from_response("{}"), Err(InpaintError::NoImage)));
    }

    #[test]
    fn corrupt_image_data_is_a_decode_error() {
        let body = r#"{"candidates":[{"content":{"parts":[{"inlineData":{"data":"!!!"}}]}}]}"#;
        assert!(matches!(image_from_response(body), Err(InpaintError::Decode(_))));
    }

    #[test]
    fn invalid_key_is_recognized() {
        let body = r#"{"error":{"message":"API key not valid. Please pass a valid API key."}}"#;
        assert!(matches!(classify_failure(400, body), InpaintError::InvalidApiKey));
        assert!(matches!(classify_failure(500, "oops"), InpaintError::Http(_)));
    }

    #[test]
    fn missing_key_fails_before_any_network() {
        let g = GeminiInpainter::new(None, Duration::from_secs(1)).unwrap();
        let payload = EncodedImage::png(&Image::new(1, 1)).unwrap();
        assert!(matches!(
            g.inpaint(&payload, "x"),
            Err(InpaintError::MissingApiKey)
        ));
    }
}
