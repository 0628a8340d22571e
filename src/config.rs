use crate::docs::chunk::DEFAULT_CHUNK_SIZE;
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Runtime settings for the claim pipeline.
///
/// The only setting that changes behaviour is `llm_api_key`: when it is
/// absent every stage runs its heuristic path.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub chunk_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_base_url: DEFAULT_BASE_URL.to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let llm_api_key = dotenv::var("LLM_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let llm_base_url = dotenv::var("LLM_BASE_URL").unwrap_or(defaults.llm_base_url);
        let llm_model = dotenv::var("LLM_MODEL").unwrap_or(defaults.llm_model);
        let chunk_size = dotenv::var("CHUNK_SIZE")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.chunk_size);

        Self {
            llm_api_key,
            llm_base_url,
            llm_model,
            chunk_size,
        }
    }

    /// Replace the credential. An empty string clears it.
    pub fn with_api_key(mut self, key: Option<&str>) -> Self {
        self.llm_api_key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.llm_api_key.is_some()
    }

    /// Key suitable for logs and chat output.
    pub fn masked_api_key(&self) -> String {
        match &self.llm_api_key {
            None => "(not set)".to_string(),
            Some(k) if k.chars().count() <= 8 => "****".to_string(),
            Some(k) => {
                let head: String = k.chars().take(4).collect();
                let skip = k.chars().count().saturating_sub(4);
                let tail: String = k.chars().skip(skip).collect();
                format!("{}…{}", head, tail)
            }
        }
    }
}
