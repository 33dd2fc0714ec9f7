use crate::dtos::{GeminiContent, GeminiPart, GeminiRequest};
use crate::error::{ErrorMessage, HttpError};

/// HTTP client wrapper for calls to the Gemini API
///
/// Cloning is cheap because reqwest::Client uses Arc internally
#[derive(Clone)]
pub struct HttpClient {
    pub conn: reqwest::Client,
}

impl HttpClient {
    pub fn new(conn: reqwest::Client) -> Self {
        Self { conn }
    }

    /// Send one prompt to `generateContent` and return the model's text.
    ///
    /// # Returns
    /// - `Ok(String)`: first candidate's text, trimmed
    /// - `Err(HttpError)`: 502 when the call fails, the API answers with an
    ///   error status, or no text comes back
    pub async fn generate_content(
        &self,
        base_url: &str,
        model_name: &str,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, HttpError> {
        let full_url = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model_name
        );

        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .conn
            .post(full_url)
            .query(&[("key", api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                HttpError::bad_gateway(ErrorMessage::ChatUnavailable.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Gemini returned an error: {}", body);
            return Err(HttpError::bad_gateway(
                ErrorMessage::ChatUnavailable.to_string(),
            ));
        }

        let json_value: serde_json::Value = response.json().await.map_err(|e| {
            tracing::error!("Gemini response is not JSON: {}", e);
            HttpError::bad_gateway(ErrorMessage::ChatUnavailable.to_string())
        })?;

        extract_text(&json_value).ok_or_else(|| {
            tracing::error!("Could not find text in Gemini response");
            HttpError::bad_gateway(ErrorMessage::ChatUnavailable.to_string())
        })
    }
}

/// `candidates[0].content.parts[*].text`, joined; `None` when empty
fn extract_text(json_value: &serde_json::Value) -> Option<String> {
    let parts = json_value["candidates"][0]["content"]["parts"].as_array()?;

    let text = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect::<String>();

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_candidate_text() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "Hay 3 "}, {"text": "publicaciones.\n"}],
                    "role": "model"
                }
            }]
        });

        assert_eq!(extract_text(&body).as_deref(), Some("Hay 3 publicaciones."));
    }

    #[test]
    fn blank_or_missing_text_is_none() {
        assert_eq!(extract_text(&json!({"candidates": []})), None);
        assert_eq!(
            extract_text(&json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]})),
            None
        );
        assert_eq!(extract_text(&json!({"promptFeedback": {"blockReason": "SAFETY"}})), None);
    }
}
