//! Case study and testimonial persistence.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::types::{CaseStudy, CaseStudyInput, Testimonial, TestimonialInput};

/// Listing order is newest first for both collections.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_case_studies(&self) -> Result<Vec<CaseStudy>>;
    async fn create_case_study(&self, input: CaseStudyInput) -> Result<CaseStudy>;
    /// `None` when no case study has this id.
    async fn update_case_study(&self, id: Uuid, input: CaseStudyInput)
        -> Result<Option<CaseStudy>>;
    /// `false` when no case study has this id.
    async fn delete_case_study(&self, id: Uuid) -> Result<bool>;
    async fn count_case_studies(&self) -> Result<usize>;

    async fn list_testimonials(&self) -> Result<Vec<Testimonial>>;
    async fn create_testimonial(&self, input: TestimonialInput) -> Result<Testimonial>;
    async fn update_testimonial(
        &self,
        id: Uuid,
        input: TestimonialInput,
    ) -> Result<Option<Testimonial>>;
    async fn delete_testimonial(&self, id: Uuid) -> Result<bool>;
    async fn count_testimonials(&self) -> Result<usize>;
}

#[derive(Clone, Debug)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn count_from_row(row: &PgRow) -> Result<usize> {
    let count: i64 = row.try_get("count")?;
    usize::try_from(count).context("row count out of range")
}

fn case_study_from_row(row: &PgRow) -> Result<CaseStudy, sqlx::Error> {
    Ok(CaseStudy {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        client: row.try_get("client")?,
        summary: row.try_get("summary")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn testimonial_from_row(row: &PgRow) -> Result<Testimonial, sqlx::Error> {
    Ok(Testimonial {
        id: row.try_get("id")?,
        author: row.try_get("author")?,
        company: row.try_get("company")?,
        quote: row.try_get("quote")?,
        avatar_url: row.try_get("avatar_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn list_case_studies(&self) -> Result<Vec<CaseStudy>> {
        let query = "SELECT id, title, client, summary, image_url, created_at, updated_at \
                     FROM case_studies ORDER BY created_at DESC";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to list case studies")?;
        rows.iter()
            .map(|row| case_study_from_row(row).context("failed to decode case study"))
            .collect()
    }

    async fn create_case_study(&self, input: CaseStudyInput) -> Result<CaseStudy> {
        let query = "INSERT INTO case_studies (id, title, client, summary, image_url) \
                     VALUES ($1, $2, $3, $4, $5) \
                     RETURNING id, title, client, summary, image_url, created_at, updated_at";
        let row = sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(&input.title)
            .bind(&input.client)
            .bind(&input.summary)
            .bind(&input.image_url)
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", query))
            .await
            .context("failed to insert case study")?;
        case_study_from_row(&row).context("failed to decode case study")
    }

    async fn update_case_study(
        &self,
        id: Uuid,
        input: CaseStudyInput,
    ) -> Result<Option<CaseStudy>> {
        let query = "UPDATE case_studies \
                     SET title = $2, client = $3, summary = $4, image_url = $5, updated_at = NOW() \
                     WHERE id = $1 \
                     RETURNING id, title, client, summary, image_url, created_at, updated_at";
        let row = sqlx::query(query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.client)
            .bind(&input.summary)
            .bind(&input.image_url)
            .fetch_optional(&self.pool)
            .instrument(db_span("UPDATE", query))
            .await
            .context("failed to update case study")?;
        row.as_ref()
            .map(case_study_from_row)
            .transpose()
            .context("failed to decode case study")
    }

    async fn delete_case_study(&self, id: Uuid) -> Result<bool> {
        let query = "DELETE FROM case_studies WHERE id = $1";
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await
            .context("failed to delete case study")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_case_studies(&self) -> Result<usize> {
        let query = "SELECT COUNT(*) AS count FROM case_studies";
        let row = sqlx::query(query)
            .fetch_one(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to count case studies")?;
        count_from_row(&row)
    }

    async fn list_testimonials(&self) -> Result<Vec<Testimonial>> {
        let query = "SELECT id, author, company, quote, avatar_url, created_at, updated_at \
                     FROM testimonials ORDER BY created_at DESC";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to list testimonials")?;
        rows.iter()
            .map(|row| testimonial_from_row(row).context("failed to decode testimonial"))
            .collect()
    }

    async fn create_testimonial(&self, input: TestimonialInput) -> Result<Testimonial> {
        let query = "INSERT INTO testimonials (id, author, company, quote, avatar_url) \
                     VALUES ($1, $2, $3, $4, $5) \
                     RETURNING id, author, company, quote, avatar_url, created_at, updated_at";
        let row = sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(&input.author)
            .bind(&input.company)
            .bind(&input.quote)
            .bind(&input.avatar_url)
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", query))
            .await
            .context("failed to insert testimonial")?;
        testimonial_from_row(&row).context("failed to decode testimonial")
    }

    async fn update_testimonial(
        &self,
        id: Uuid,
        input: TestimonialInput,
    ) -> Result<Option<Testimonial>> {
        let query = "UPDATE testimonials \
                     SET author = $2, company = $3, quote = $4, avatar_url = $5, updated_at = NOW() \
                     WHERE id = $1 \
                     RETURNING id, author, company, quote, avatar_url, created_at, updated_at";
        let row = sqlx::query(query)
            .bind(id)
            .bind(&input.author)
            .bind(&input.company)
            .bind(&input.quote)
            .bind(&input.avatar_url)
            .fetch_optional(&self.pool)
            .instrument(db_span("UPDATE", query))
            .await
            .context("failed to update testimonial")?;
        row.as_ref()
            .map(testimonial_from_row)
            .transpose()
            .context("failed to decode testimonial")
    }

    async fn delete_testimonial(&self, id: Uuid) -> Result<bool> {
        let query = "DELETE FROM testimonials WHERE id = $1";
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await
            .context("failed to delete testimonial")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_testimonials(&self) -> Result<usize> {
        let query = "SELECT COUNT(*) AS count FROM testimonials";
        let row = sqlx::query(query)
            .fetch_one(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to count testimonials")?;
        count_from_row(&row)
    }
}

/// In-process content store. Entries are kept newest first.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    case_studies: RwLock<Vec<CaseStudy>>,
    testimonials: RwLock<Vec<Testimonial>>,
}

impl MemoryContentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn list_case_studies(&self) -> Result<Vec<CaseStudy>> {
        Ok(self.case_studies.read().await.clone())
    }

    async fn create_case_study(&self, input: CaseStudyInput) -> Result<CaseStudy> {
        let now = OffsetDateTime::now_utc();
        let case_study = CaseStudy {
            id: Uuid::new_v4(),
            title: input.title,
            client: input.client,
            summary: input.summary,
            image_url: input.image_url,
            created_at: now,
            updated_at: now,
        };
        self.case_studies.write().await.insert(0, case_study.clone());
        Ok(case_study)
    }

    async fn update_case_study(
        &self,
        id: Uuid,
        input: CaseStudyInput,
    ) -> Result<Option<CaseStudy>> {
        let mut case_studies = self.case_studies.write().await;
        Ok(case_studies.iter_mut().find(|c| c.id == id).map(|existing| {
            existing.title = input.title;
            existing.client = input.client;
            existing.summary = input.summary;
            existing.image_url = input.image_url;
            existing.updated_at = OffsetDateTime::now_utc();
            existing.clone()
        }))
    }

    async fn delete_case_study(&self, id: Uuid) -> Result<bool> {
        let mut case_studies = self.case_studies.write().await;
        let before = case_studies.len();
        case_studies.retain(|c| c.id != id);
        Ok(case_studies.len() < before)
    }

    async fn count_case_studies(&self) -> Result<usize> {
        Ok(self.case_studies.read().await.len())
    }

    async fn list_testimonials(&self) -> Result<Vec<Testimonial>> {
        Ok(self.testimonials.read().await.clone())
    }

    async fn create_testimonial(&self, input: TestimonialInput) -> Result<Testimonial> {
        let now = OffsetDateTime::now_utc();
        let testimonial = Testimonial {
            id: Uuid::new_v4(),
            author: input.author,
            company: input.company,
            quote: input.quote,
            avatar_url: input.avatar_url,
            created_at: now,
            updated_at: now,
        };
        self.testimonials.write().await.insert(0, testimonial.clone());
        Ok(testimonial)
    }

    async fn update_testimonial(
        &self,
        id: Uuid,
        input: TestimonialInput,
    ) -> Result<Option<Testimonial>> {
        let mut testimonials = self.testimonials.write().await;
        Ok(testimonials.iter_mut().find(|t| t.id == id).map(|existing| {
            existing.author = input.author;
            existing.company = input.company;
            existing.quote = input.quote;
            existing.avatar_url = input.avatar_url;
            existing.updated_at = OffsetDateTime::now_utc();
            existing.clone()
        }))
    }

    async fn delete_testimonial(&self, id: Uuid) -> Result<bool> {
        let mut testimonials = self.testimonials.write().await;
        let before = testimonials.len();
        testimonials.retain(|t| t.id != id);
        Ok(testimonials.len() < before)
    }

    async fn count_testimonials(&self) -> Result<usize> {
        Ok(self.testimonials.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str) -> CaseStudyInput {
        CaseStudyInput {
            title: title.to_string(),
            client: "Acme".to_string(),
            summary: "Summary".to_string(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn memory_store_lists_newest_first() -> Result<()> {
        let store = MemoryContentStore::new();
        store.create_case_study(input("first")).await?;
        store.create_case_study(input("second")).await?;
        let titles: Vec<_> = store
            .list_case_studies()
            .await?
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert_eq!(store.count_case_studies().await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn memory_store_update_keeps_created_at() -> Result<()> {
        let store = MemoryContentStore::new();
        let created = store.create_case_study(input("draft")).await?;
        let updated = store
            .update_case_study(created.id, input("final"))
            .await?
            .ok_or_else(|| anyhow::anyhow!("missing case study"))?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "final");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert!(store
            .update_case_study(Uuid::new_v4(), input("x"))
            .await?
            .is_none());
        Ok(())
    }

    #[tokio::test]
    async fn memory_store_delete_reports_missing() -> Result<()> {
        let store = MemoryContentStore::new();
        let created = store
            .create_testimonial(TestimonialInput {
                author: "Jane".to_string(),
                company: "Acme".to_string(),
                quote: "Great".to_string(),
                avatar_url: None,
            })
            .await?;
        assert_eq!(store.count_testimonials().await?, 1);
        assert!(store.delete_testimonial(created.id).await?);
        assert_eq!(store.count_testimonials().await?, 0);
        assert!(!store.delete_testimonial(created.id).await?);
        assert!(store.list_testimonials().await?.is_empty());
        Ok(())
    }
}
