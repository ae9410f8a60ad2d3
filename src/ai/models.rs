//! AI Service Models
//!
//! Request/response shapes of the Ollama `/api/generate` endpoint and the
//! structured results extracted from model output.

use serde::{Deserialize, Deserializer, Serialize};

/// Hints extracted from a customer's free-text instructions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstructionAnalysis {
    #[serde(default)]
    pub spice_level: Option<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub allergies: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub preferences: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub special_requests: Vec<String>,
}

/// Accepts a list, a single string, or null. Models are not consistent.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<String>),
        One(String),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(list)) => list,
        Some(OneOrMany::One(value)) if value.trim().is_empty() => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
    })
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,

    /// `"json"` asks the model to emit a JSON document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'a str>,

    pub options: GenerateOptions,
}

#[derive(Debug, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,

    /// Maximum number of tokens to generate
    pub num_predict: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
}
