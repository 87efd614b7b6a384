//! Completion client boundary.

use crate::error::Result;
use serde::Serialize;

/// Author of a conversation turn, as the completion API names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One turn of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    /// A turn authored by the user.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// A turn authored by the model.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_output_tokens: u32,
}

/// A fully composed request for the completion API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    /// System-level instruction, if any.
    pub system_instruction: Option<String>,

    /// Ordered conversation; the last turn is the new request.
    pub turns: Vec<Turn>,

    /// Sampling parameters.
    pub params: GenerationParams,
}

impl CompletionRequest {
    /// The turn carrying the new request.
    #[must_use]
    pub fn final_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

/// Sends composed requests to a language model.
pub trait CompletionClient {
    /// Generate a reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the model produced no text.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_turn_is_last() {
        let request = CompletionRequest {
            system_instruction: None,
            turns: vec![Turn::model("xin chào"), Turn::user("viết tiếp")],
            params: GenerationParams {
                temperature: 0.5,
                max_output_tokens: 1024,
            },
        };
        assert_eq!(request.final_turn().unwrap().text, "viết tiếp");
        assert_eq!(request.final_turn().unwrap().role, TurnRole::User);
    }

    #[test]
    fn params_serialize_camel_case() {
        let json = serde_json::to_string(&GenerationParams {
            temperature: 0.25,
            max_output_tokens: 8192,
        })
        .unwrap();
        assert_eq!(json, r#"{"temperature":0.25,"maxOutputTokens":8192}"#);
    }
}
