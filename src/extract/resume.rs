use std::fmt;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::{collect_labels, ensure_not_blank, find_text, join_labels, ExtractionError};

// ── Markup signatures ────────────────────────────────────────────────────────

static NAME: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"h2[data-qa="resume-personal-name"]"#).unwrap());

static TARGET_POSITION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"span[data-qa="resume-block-title-position"]"#).unwrap());

static EXPERIENCE_BLOCK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[data-qa="resume-block-experience"]"#).unwrap());

static PERIOD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.resume-block__period").unwrap());

static EMPLOYER: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.resume-block__sub-title").unwrap());

static POSITION: Lazy<Selector> = Lazy::new(|| Selector::parse("div.resume-block__title").unwrap());

static DUTIES: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.resume-block__description").unwrap());

static SKILLS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[data-qa="skills-table"]"#).unwrap());

// ── Placeholders ─────────────────────────────────────────────────────────────

pub const NO_NAME: &str = "Имя не указано";
pub const NO_POSITION: &str = "Должность не указана";
pub const NO_PERIOD: &str = "Период не указан";
pub const NO_EMPLOYER: &str = "Компания не указана";
pub const NO_DUTIES: &str = "Описание отсутствует";
pub const NO_EXPERIENCE: &str = "Опыт не указан";
pub const NO_SKILLS: &str = "Навыки не указаны";

const ENTRY_SEPARATOR: &str = "\n---\n";
const ERROR_PREFIX: &str = "Ошибка извлечения данных резюме";

// ── Experience entry ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceEntry {
    pub period: String,
    pub company: String,
    pub position: String,
    pub description: String,
}

impl ExperienceEntry {
    /// Each sub-field falls back on its own placeholder.
    fn parse(block: ElementRef<'_>) -> Self {
        Self {
            period: find_text(block, &PERIOD).or_placeholder(NO_PERIOD),
            company: find_text(block, &EMPLOYER).or_placeholder(NO_EMPLOYER),
            position: find_text(block, &POSITION).or_placeholder(NO_POSITION),
            description: find_text(block, &DUTIES).or_placeholder(NO_DUTIES),
        }
    }
}

impl fmt::Display for ExperienceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**{}**", self.period)?;
        writeln!(f, "*{}*", self.company)?;
        writeln!(f, "**{}**", self.position)?;
        writeln!(f, "{}", self.description)
    }
}

// ── Report ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeReport {
    pub name: String,
    pub position: String,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<String>,
}

impl ResumeReport {
    pub fn parse(html: &str) -> Result<Self, ExtractionError> {
        ensure_not_blank(html)?;

        let document = Html::parse_document(html);
        let root = document.root_element();

        let experience: Vec<ExperienceEntry> = root
            .select(&EXPERIENCE_BLOCK)
            .map(ExperienceEntry::parse)
            .collect();
        tracing::debug!(blocks = experience.len(), "experience blocks parsed");

        Ok(Self {
            name: find_text(root, &NAME).or_placeholder(NO_NAME),
            position: find_text(root, &TARGET_POSITION).or_placeholder(NO_POSITION),
            experience,
            skills: collect_labels(root, &SKILLS),
        })
    }
}

impl fmt::Display for ResumeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "# {}\n\n", self.name)?;
        write!(f, "**Целевая должность:** {}\n\n", self.position)?;

        f.write_str("## Опыт работы\n")?;
        if self.experience.is_empty() {
            f.write_str(NO_EXPERIENCE)?;
        } else {
            let entries = self
                .experience
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            f.write_str(&entries.join(ENTRY_SEPARATOR))?;
        }
        f.write_str("\n\n")?;

        write!(f, "## Ключевые навыки\n{}", join_labels(&self.skills, NO_SKILLS))
    }
}

/// Résumé page → formatted report. Failures are embedded in the returned text.
pub fn extract_resume_data(html: &str) -> String {
    match ResumeReport::parse(html) {
        Ok(report) => report.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "resume extraction failed");
            format!("{}: {}", ERROR_PREFIX, e)
        }
    }
}
