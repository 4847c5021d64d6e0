//! Content types and input validation.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ContentError;

const MAX_SHORT_TEXT: usize = 200;
const MAX_LONG_TEXT: usize = 5000;

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CaseStudy {
    pub id: Uuid,
    pub title: String,
    pub client: String,
    pub summary: String,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Testimonial {
    pub id: Uuid,
    pub author: String,
    pub company: String,
    pub quote: String,
    pub avatar_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CaseStudyInput {
    pub title: String,
    pub client: String,
    pub summary: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TestimonialInput {
    pub author: String,
    pub company: String,
    pub quote: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct DashboardResponse {
    pub email: String,
    pub case_studies: usize,
    pub testimonials: usize,
}

impl CaseStudyInput {
    /// Trim fields and check limits, returning the cleaned input.
    ///
    /// # Errors
    /// Returns `ContentError::Validation` naming the first offending field.
    pub fn validate(self) -> Result<Self, ContentError> {
        Ok(Self {
            title: required_text("title", &self.title, MAX_SHORT_TEXT)?,
            client: required_text("client", &self.client, MAX_SHORT_TEXT)?,
            summary: required_text("summary", &self.summary, MAX_LONG_TEXT)?,
            image_url: optional_url("image_url", self.image_url.as_deref())?,
        })
    }
}

impl TestimonialInput {
    /// Trim fields and check limits, returning the cleaned input.
    ///
    /// # Errors
    /// Returns `ContentError::Validation` naming the first offending field.
    pub fn validate(self) -> Result<Self, ContentError> {
        Ok(Self {
            author: required_text("author", &self.author, MAX_SHORT_TEXT)?,
            company: required_text("company", &self.company, MAX_SHORT_TEXT)?,
            quote: required_text("quote", &self.quote, MAX_LONG_TEXT)?,
            avatar_url: optional_url("avatar_url", self.avatar_url.as_deref())?,
        })
    }
}

fn required_text(field: &str, value: &str, max_chars: usize) -> Result<String, ContentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContentError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(ContentError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Empty strings count as "not set"; anything else must be an http(s) URL.
fn optional_url(field: &str, value: Option<&str>) -> Result<Option<String>, ContentError> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Some(trimmed.to_string())),
        _ => Err(ContentError::Validation(format!(
            "{field} must be an http(s) URL"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn case_study_input() -> CaseStudyInput {
        CaseStudyInput {
            title: "  Atlas  ".to_string(),
            client: "Acme".to_string(),
            summary: "Rebuilt the data platform.".to_string(),
            image_url: Some(" https://cdn.cedarcore.dev/atlas.png ".to_string()),
        }
    }

    #[test]
    fn case_study_input_is_trimmed() {
        let input = case_study_input().validate().unwrap();
        assert_eq!(input.title, "Atlas");
        assert_eq!(
            input.image_url.as_deref(),
            Some("https://cdn.cedarcore.dev/atlas.png")
        );
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut input = case_study_input();
        input.client = "   ".to_string();
        let err = input.validate().unwrap_err();
        assert_eq!(err.to_string(), "client is required");
    }

    #[test]
    fn overlong_field_is_rejected() {
        let mut input = case_study_input();
        input.title = "x".repeat(MAX_SHORT_TEXT + 1);
        assert!(matches!(input.validate(), Err(ContentError::Validation(_))));
    }

    #[test]
    fn empty_url_means_none() {
        let mut input = case_study_input();
        input.image_url = Some(String::new());
        assert_eq!(input.validate().unwrap().image_url, None);
    }

    #[test]
    fn non_http_url_is_rejected() {
        let input = TestimonialInput {
            author: "Jane".to_string(),
            company: "Acme".to_string(),
            quote: "Great team.".to_string(),
            avatar_url: Some("javascript:alert(1)".to_string()),
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.to_string(), "avatar_url must be an http(s) URL");
    }

    #[test]
    fn testimonial_input_defaults_avatar() -> anyhow::Result<()> {
        let input: TestimonialInput =
            serde_json::from_str(r#"{"author":"Jane","company":"Acme","quote":"Great team."}"#)?;
        assert_eq!(input.avatar_url, None);
        Ok(())
    }
}
