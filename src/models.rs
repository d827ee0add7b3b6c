use serde::{Deserialize, Serialize};

use crate::markdown::render_html;
use crate::pipeline::Analysis;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub job_url: String,
    #[serde(default)]
    pub resume_url: String,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub analysis: String,
    pub analysis_html: String,
    pub model: String,
    pub vacancy_chars: usize,
    pub resume_chars: usize,
}

impl From<Analysis> for ScoreResponse {
    fn from(analysis: Analysis) -> Self {
        Self {
            analysis_html: render_html(&analysis.text),
            analysis: analysis.text,
            model: analysis.model,
            vacancy_chars: analysis.vacancy_chars,
            resume_chars: analysis.resume_chars,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}
