use std::fmt;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::{
    collect_labels, contains_captcha, ensure_not_blank, find_multiline_text, find_text,
    join_labels, ExtractionError,
};

// ── Markup signatures ────────────────────────────────────────────────────────

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());

static SALARY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"span[data-qa="vacancy-salary"]"#).unwrap());

static COMPANY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[data-qa="vacancy-company-name"]"#).unwrap());

static DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[data-qa="vacancy-description"]"#).unwrap());

static SKILLS: Lazy<Selector> = Lazy::new(|| Selector::parse("div.bloko-tag-list").unwrap());

// ── Placeholders ─────────────────────────────────────────────────────────────

pub const NO_TITLE: &str = "Нет названия";
pub const NO_SALARY: &str = "Не указана";
pub const HIDDEN_COMPANY: &str = "Компания скрыта";
pub const NO_DESCRIPTION: &str = "Описание не найдено";
pub const NO_SKILLS: &str = "Не указаны";

const ERROR_PREFIX: &str = "Ошибка извлечения данных вакансии";

// ── Report ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacancyReport {
    pub title: String,
    pub company: String,
    pub salary: String,
    pub description: String,
    pub skills: Vec<String>,
}

impl VacancyReport {
    /// Parses a vacancy page. Fails only on a captcha page or a blank document.
    pub fn parse(html: &str) -> Result<Self, ExtractionError> {
        ensure_not_blank(html)?;
        if contains_captcha(html) {
            return Err(ExtractionError::CaptchaDetected);
        }

        let document = Html::parse_document(html);
        let root = document.root_element();

        let title = find_text(root, &TITLE);
        if title.is_missing() {
            tracing::debug!("vacancy title not found, using placeholder");
        }

        Ok(Self {
            title: title.or_placeholder(NO_TITLE),
            company: find_text(root, &COMPANY).or_placeholder(HIDDEN_COMPANY),
            salary: find_text(root, &SALARY).or_placeholder(NO_SALARY),
            description: find_multiline_text(root, &DESCRIPTION).or_placeholder(NO_DESCRIPTION),
            skills: collect_labels(root, &SKILLS),
        })
    }
}

impl fmt::Display for VacancyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "# {}\n\n", self.title)?;
        write!(f, "**Компания:** {}\n\n", self.company)?;
        write!(f, "**Зарплата:** {}\n\n", self.salary)?;
        write!(f, "## Описание вакансии\n{}\n\n", self.description)?;
        write!(f, "## Ключевые навыки\n{}", join_labels(&self.skills, NO_SKILLS))
    }
}

/// Vacancy page → formatted report. Failures are embedded in the returned text.
pub fn extract_vacancy_data(html: &str) -> String {
    match VacancyReport::parse(html) {
        Ok(report) => report.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "vacancy extraction failed");
            format!("{}: {}", ERROR_PREFIX, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <div class="vacancy-title"><h1 data-qa="vacancy-title">Senior Rust Developer</h1></div>
  <span data-qa="vacancy-salary">от 300 000 ₽ на руки</span>
  <a data-qa="vacancy-company-name" href="/employer/1"><span>ООО Ромашка</span></a>
  <div data-qa="vacancy-description">
    <p>Разрабатываем высоконагруженные сервисы.</p>
    <ul><li>Tokio</li><li>PostgreSQL</li></ul>
  </div>
  <div class="bloko-tag-list">
    <div class="bloko-tag"><span class="bloko-tag__section_text">Rust</span></div>
    <div class="bloko-tag"><span class="bloko-tag__section_text">Linux</span></div>
    <div class="bloko-tag"><span class="bloko-tag__section_text">Kafka</span></div>
  </div>
</body></html>"#;

    #[test]
    fn full_page_renders_every_section_in_order() {
        let out = extract_vacancy_data(FULL_PAGE);

        assert!(out.starts_with("# Senior Rust Developer\n\n"));
        let company = out.find("**Компания:** ООО Ромашка").expect("company");
        let salary = out.find("**Зарплата:** от 300 000 ₽ на руки").expect("salary");
        let description = out
            .find("## Описание вакансии\nРазрабатываем высоконагруженные сервисы.")
            .expect("description");
        let skills = out
            .find("## Ключевые навыки\nRust, Linux, Kafka")
            .expect("skills");

        assert!(company < salary && salary < description && description < skills);
        assert!(out.ends_with("Rust, Linux, Kafka"));
    }

    #[test]
    fn description_keeps_list_items_on_own_lines() {
        let report = VacancyReport::parse(FULL_PAGE).unwrap();
        assert_eq!(
            report.description,
            "Разрабатываем высоконагруженные сервисы.\n\n    \nTokio\nPostgreSQL"
        );
    }

    #[test]
    fn missing_salary_uses_placeholder() {
        let html = r#"<html><body>
            <h1>Backend Engineer</h1>
            <a data-qa="vacancy-company-name">Acme</a>
        </body></html>"#;
        let out = extract_vacancy_data(html);

        assert!(out.starts_with("# Backend Engineer"));
        assert!(out.contains("**Компания:** Acme"));
        assert!(out.contains("**Зарплата:** Не указана"));
    }

    #[test]
    fn page_without_markers_uses_every_placeholder() {
        let out = extract_vacancy_data("<html><body><p>nothing here</p></body></html>");
        assert_eq!(
            out,
            "# Нет названия\n\n\
             **Компания:** Компания скрыта\n\n\
             **Зарплата:** Не указана\n\n\
             ## Описание вакансии\nОписание не найдено\n\n\
             ## Ключевые навыки\nНе указаны"
        );
    }

    #[test]
    fn skill_container_without_labels_falls_back() {
        let html = r#"<h1>QA</h1><div class="bloko-tag-list"><span>loose</span></div>"#;
        let report = VacancyReport::parse(html).unwrap();
        assert!(report.skills.is_empty());
        assert!(report.to_string().ends_with("## Ключевые навыки\nНе указаны"));
    }

    #[test]
    fn captcha_page_is_rejected_without_partial_report() {
        let html = r#"<html><body><h1>Senior Rust Developer</h1>
            <form action="/account/Captcha"></form></body></html>"#;

        assert_eq!(
            VacancyReport::parse(html),
            Err(ExtractionError::CaptchaDetected)
        );
        let out = extract_vacancy_data(html);
        assert_eq!(
            out,
            "Ошибка извлечения данных вакансии: Обнаружена капча! Попробуйте позже"
        );
        assert!(!out.contains("Senior Rust Developer"));
    }

    #[test]
    fn blank_page_is_reported_as_text() {
        assert_eq!(
            extract_vacancy_data("   "),
            "Ошибка извлечения данных вакансии: Пустой HTML-документ"
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        assert_eq!(extract_vacancy_data(FULL_PAGE), extract_vacancy_data(FULL_PAGE));
    }
}
