use serde_json::json;
use voxscreen_core::ApiKey;

use crate::request::{Body, HttpRequest};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Fixed analysis instruction sent with every recording.
///
/// The five target categories and the cautious, non-diagnostic register are
/// part of the product contract; do not reword casually.
pub const ANALYSIS_PROMPT: &str = "Analyze this voice recording for potential indicators of the following health conditions: Asthma, COPD, Lung Infection, Throat Issues, and Depression. You are an expert in vocal biomarkers. Be cautious and empathetic in your analysis. Do not provide a medical diagnosis. The user is looking for potential risks. Evaluate the user's speech, breathing patterns, tone, and any audible artifacts like coughing or wheezing. Provide a structured analysis in JSON format.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiAnalysisConfig {
    pub base_url: String,
    pub api_key: ApiKey,
    pub model: String,
}

impl GeminiAnalysisConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key,
            model: DEFAULT_MODEL.into(),
        }
    }
}

/// Audio in the transport encoding the service expects: base64 text plus
/// the payload's MIME tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    pub data_base64: String,
    pub mime_type: String,
}

pub fn build_generate_content_request(
    cfg: &GeminiAnalysisConfig,
    audio: &EncodedAudio,
) -> HttpRequest {
    let url = join_url(
        &cfg.base_url,
        &format!("/v1beta/models/{}:generateContent", cfg.model),
    );

    let payload = json!({
        "contents": [{
            "parts": [
                { "text": ANALYSIS_PROMPT },
                {
                    "inlineData": {
                        "mimeType": audio.mime_type,
                        "data": audio.data_base64,
                    }
                }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": analysis_schema(),
        }
    });

    HttpRequest {
        method: "POST".into(),
        url,
        headers: vec![
            ("Content-Type".into(), "application/json".into()),
            ("x-goog-api-key".into(), cfg.api_key.as_str().into()),
        ],
        body: Body::Json(payload.to_string()),
    }
}

/// Response schema the service is asked to validate against server-side.
fn analysis_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "A brief overall summary of the voice analysis, written in a gentle and supportive tone."
            },
            "conditions": {
                "type": "ARRAY",
                "description": "An array of potential health conditions analyzed from the voice.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "conditionName": {
                            "type": "STRING",
                            "description": "The name of the health condition being analyzed (e.g., 'Asthma', 'COPD', 'Depression')."
                        },
                        "riskLevel": {
                            "type": "STRING",
                            "enum": ["Low", "Medium", "High", "Minimal", "Not Detected"],
                            "description": "The assessed risk level for this condition based on the voice analysis."
                        },
                        "explanation": {
                            "type": "STRING",
                            "description": "A detailed explanation of why this risk level was assigned, citing specific vocal indicators if possible."
                        },
                        "symptoms": {
                            "type": "ARRAY",
                            "description": "A list of key vocal indicators or symptoms that were detected or are associated with this condition.",
                            "items": { "type": "STRING" }
                        }
                    },
                    "required": ["conditionName", "riskLevel", "explanation", "symptoms"]
                }
            }
        },
        "required": ["summary", "conditions"]
    })
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}
