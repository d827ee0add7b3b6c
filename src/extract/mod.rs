use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

pub mod resume;
pub mod vacancy;

pub use resume::extract_resume_data;
pub use vacancy::extract_vacancy_data;

// ── Lazy statics ─────────────────────────────────────────────────────────────

static CAPTCHA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)captcha").unwrap());

/// Tag label inside both the vacancy tag list and the résumé skills table.
static SKILL_LABEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.bloko-tag__section_text").unwrap());

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("Обнаружена капча! Попробуйте позже")]
    CaptchaDetected,
    #[error("Пустой HTML-документ")]
    EmptyDocument,
}

// ── Field lookup ─────────────────────────────────────────────────────────────

/// Outcome of looking up one named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lookup {
    Found(String),
    Missing,
}

impl Lookup {
    fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Lookup::Missing
        } else {
            Lookup::Found(trimmed.to_string())
        }
    }

    pub(crate) fn is_missing(&self) -> bool {
        matches!(self, Lookup::Missing)
    }

    pub(crate) fn or_placeholder(self, placeholder: &str) -> String {
        match self {
            Lookup::Found(text) => text,
            Lookup::Missing => placeholder.to_string(),
        }
    }
}

/// First match of `selector` under `scope`, as trimmed concatenated text.
pub(crate) fn find_text(scope: ElementRef<'_>, selector: &Selector) -> Lookup {
    scope
        .select(selector)
        .next()
        .map(|el| Lookup::from_text(&collect_text(el)))
        .unwrap_or(Lookup::Missing)
}

/// Like [`find_text`], but keeps text nodes on separate lines.
pub(crate) fn find_multiline_text(scope: ElementRef<'_>, selector: &Selector) -> Lookup {
    scope
        .select(selector)
        .next()
        .map(|el| Lookup::from_text(&collect_text_lines(el)))
        .unwrap_or(Lookup::Missing)
}

/// Skill labels from the first `container` under `scope`, in document order.
pub(crate) fn collect_labels(scope: ElementRef<'_>, container: &Selector) -> Vec<String> {
    let Some(container) = scope.select(container).next() else {
        return Vec::new();
    };
    container
        .select(&SKILL_LABEL)
        .map(|label| collect_text(label).trim().to_string())
        .filter(|label| !label.is_empty())
        .collect()
}

pub(crate) fn join_labels(labels: &[String], placeholder: &str) -> String {
    if labels.is_empty() {
        placeholder.to_string()
    } else {
        labels.join(", ")
    }
}

// ── Document guards ──────────────────────────────────────────────────────────

pub(crate) fn contains_captcha(html: &str) -> bool {
    CAPTCHA_RE.is_match(html)
}

pub(crate) fn ensure_not_blank(html: &str) -> Result<(), ExtractionError> {
    if html.trim().is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }
    Ok(())
}

// ── DOM utility helpers ──────────────────────────────────────────────────────

fn collect_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Text nodes joined by newlines, outer whitespace stripped. Inner
/// whitespace-only nodes are kept as they are.
fn collect_text_lines(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join("\n").trim().to_string()
}
