use crate::extract::{extract_resume_data, extract_vacancy_data};
use crate::fetch::{FetchError, PageFetcher};
use crate::scoring::{build_user_prompt, ErrorReporter, ScoringClient};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Пожалуйста, введите обе ссылки!")]
    MissingInput,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Не задан DEEPSEEK_API_KEY")]
    MissingCredential,
    #[error("Не удалось получить ответ от DeepSeek API")]
    NoAnalysis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub text: String,
    pub model: String,
    pub vacancy_chars: usize,
    pub resume_chars: usize,
}

/// Vacancy + résumé URLs in, scoring report out. Every step runs in sequence.
#[derive(Debug, Clone)]
pub struct Pipeline {
    fetcher: PageFetcher,
    scorer: ScoringClient,
}

impl Pipeline {
    pub fn new(fetcher: PageFetcher, scorer: ScoringClient) -> Self {
        Self { fetcher, scorer }
    }

    pub fn model(&self) -> &str {
        &self.scorer.config().model
    }

    pub async fn run(
        &self,
        job_url: &str,
        resume_url: &str,
        api_key: Option<&str>,
        reporter: &dyn ErrorReporter,
    ) -> Result<Analysis, PipelineError> {
        let (job_url, resume_url) = (job_url.trim(), resume_url.trim());
        if job_url.is_empty() || resume_url.is_empty() {
            return Err(PipelineError::MissingInput);
        }
        self.fetcher.validate_url(job_url)?;
        self.fetcher.validate_url(resume_url)?;
        let api_key = api_key.ok_or(PipelineError::MissingCredential)?;

        let job_page = self.fetcher.fetch(job_url).await?;
        let resume_page = self.fetcher.fetch(resume_url).await?;

        tracing::debug!(
            vacancy = %job_page.url,
            vacancy_status = job_page.status,
            resume = %resume_page.url,
            resume_status = resume_page.status,
            "both pages fetched"
        );

        let job_text = extract_vacancy_data(&job_page.body);
        let resume_text = extract_resume_data(&resume_page.body);
        let vacancy_chars = job_text.chars().count();
        let resume_chars = resume_text.chars().count();
        tracing::info!(vacancy_chars, resume_chars, "pages extracted");

        let prompt = build_user_prompt(&job_text, &resume_text);
        let text = self
            .scorer
            .score(&prompt, api_key, reporter)
            .await
            .ok_or(PipelineError::NoAnalysis)?;

        Ok(Analysis {
            text,
            model: self.model().to_string(),
            vacancy_chars,
            resume_chars,
        })
    }
}
