//! Generation parameters

use serde::{Deserialize, Serialize};

/// Parameters for controlling text generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound on reply length, in tokens
    pub max_tokens: u32,
    /// Sampling temperature; the provider default applies when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerationConfig {
    pub fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(1024)
    }
}
