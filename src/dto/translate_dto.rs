use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct TranslatePayload {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub translated_text: String,
    pub cached: bool,
}

impl Translation {
    pub fn fresh(translated_text: String) -> Self {
        Self {
            translated_text,
            cached: false,
        }
    }

    pub fn cached(translated_text: String) -> Self {
        Self {
            translated_text,
            cached: true,
        }
    }
}
