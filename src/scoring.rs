use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_API_URL: &str = "https://api.deepseek.com/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-chat-r1";

const TEMPERATURE: f64 = 0.3;
const MAX_TOKENS: u32 = 2000;
/// Stop token for the Russian-locale model.
const STOP_TOKEN_ID: u32 = 32021;
const SCORING_TIMEOUT: Duration = Duration::from_secs(30);

pub const SYSTEM_PROMPT: &str = "\
Проскорь кандидата, насколько он подходит для данной вакансии.

1. Сначала сделай анализ по пунктам:
   - Соответствие навыков требованиям вакансии
   - Релевантность опыта работы
   - Качество заполнения резюме (понятно ли описаны задачи и решения?)

2. Отдельно оцени качество резюме по шкале от 1 до 5

3. Выставь итоговую оценку соответствия от 1 до 10

4. В конце добавь рекомендации по улучшению резюме

ОБЯЗАТЕЛЬНО придерживайся этой структуры!";

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Decode(String),
    #[error("в ответе нет ни одного варианта (choices пуст)")]
    EmptyChoices,
    #[error("в ответе нет текста (choices[0].message.content)")]
    MissingContent,
}

impl ApiError {
    /// Message surfaced to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => format!("Ошибка API: {}", self),
            _ => format!("Ошибка обработки ответа: {}", self),
        }
    }
}

// ── Error reporting ──────────────────────────────────────────────────────────

/// Side channel through which the client surfaces failures to the UI layer.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// Collects reported messages for one request.
#[derive(Debug, Default)]
pub struct CollectedErrors(Mutex<Vec<String>>);

impl CollectedErrors {
    pub fn into_messages(self) -> Vec<String> {
        self.0.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ErrorReporter for CollectedErrors {
    fn report(&self, message: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

// ── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub api_url: String,
    pub model: String,
    pub system_prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stop_token_ids: Vec<u32>,
    pub timeout: Duration,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stop_token_ids: vec![STOP_TOKEN_ID],
            timeout: SCORING_TIMEOUT,
        }
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ApiMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
    stop_token_ids: &'a [u32],
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

// ── Prompt ───────────────────────────────────────────────────────────────────

pub fn build_user_prompt(vacancy: &str, resume: &str) -> String {
    format!(
        "## ВАКАНСИЯ\n{vacancy}\n\n## РЕЗЮМЕ КАНДИДАТА\n{resume}\n\nПРОАНАЛИЗИРУЙ строго по инструкции выше!"
    )
}

// ── Client ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ScoringClient {
    client: reqwest::Client,
    config: ScoringConfig,
}

impl ScoringClient {
    pub fn new(config: ScoringConfig) -> Result<Self, ApiError> {
        let client = reqwest::ClientBuilder::new()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores `user_prompt` against the configured rubric.
    pub async fn score(
        &self,
        user_prompt: &str,
        api_key: &str,
        reporter: &dyn ErrorReporter,
    ) -> Option<String> {
        self.request_completion(&self.config.system_prompt, user_prompt, api_key, reporter)
            .await
    }

    pub async fn request_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        api_key: &str,
        reporter: &dyn ErrorReporter,
    ) -> Option<String> {
        match self.send(system_prompt, user_prompt, api_key).await {
            Ok(text) => Some(text),
            Err(e) => {
                let message = e.user_message();
                tracing::error!(api_url = %self.config.api_url, "{}", message);
                reporter.report(&message);
                None
            }
        }
    }

    async fn send(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        api_key: &str,
    ) -> Result<String, ApiError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ApiMessage {
                    role: "system",
                    content: system_prompt,
                },
                ApiMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stop_token_ids: &self.config.stop_token_ids,
        };

        tracing::info!(
            model = %self.config.model,
            prompt_chars = user_prompt.chars().count(),
            "requesting completion"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let parsed: ChatResponse =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(ApiError::EmptyChoices)?;
        let content = choice.message.content.ok_or(ApiError::MissingContent)?;

        tracing::debug!(completion_chars = content.chars().count(), "completion received");
        Ok(content)
    }
}
