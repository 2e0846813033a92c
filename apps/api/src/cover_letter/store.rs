use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::cover_letter::CoverLetterRow;

fn cover_letter_not_found() -> AppError {
    AppError::NotFound("Cover letter not found".to_string())
}

/// Callers check job ownership first; letters are keyed by job only.
pub async fn upsert_cover_letter(
    pool: &PgPool,
    job_id: Uuid,
    text: &str,
) -> Result<CoverLetterRow, AppError> {
    let row = sqlx::query_as::<_, CoverLetterRow>(
        r#"
        INSERT INTO cover_letters (job_id, text)
        VALUES ($1, $2)
        ON CONFLICT (job_id) DO UPDATE
            SET text = EXCLUDED.text, updated_at = now()
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(text)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn fetch_cover_letter(pool: &PgPool, job_id: Uuid) -> Result<CoverLetterRow, AppError> {
    sqlx::query_as::<_, CoverLetterRow>("SELECT * FROM cover_letters WHERE job_id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(cover_letter_not_found)
}

pub async fn update_cover_letter_text(
    pool: &PgPool,
    job_id: Uuid,
    text: &str,
) -> Result<CoverLetterRow, AppError> {
    sqlx::query_as::<_, CoverLetterRow>(
        "UPDATE cover_letters SET text = $1, updated_at = now() WHERE job_id = $2 RETURNING *",
    )
    .bind(text)
    .bind(job_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(cover_letter_not_found)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_job(pool: &PgPool) -> Uuid {
        let user = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2)")
            .bind(user)
            .bind(format!("{user}@example.com"))
            .execute(pool)
            .await
            .unwrap();
        sqlx::query_scalar(
            "INSERT INTO jobs (user_id, title, company, jd_raw) VALUES ($1, 'SWE', 'Acme', 'x') RETURNING id",
        )
        .bind(user)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_one_letter_per_job(pool: PgPool) {
        let job = seed_job(&pool).await;
        let first = upsert_cover_letter(&pool, job, "Dear team").await.unwrap();
        let second = upsert_cover_letter(&pool, job, "Dear Acme").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(fetch_cover_letter(&pool, job).await.unwrap().text, "Dear Acme");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_update_without_letter_is_not_found(pool: PgPool) {
        let job = seed_job(&pool).await;
        assert!(matches!(
            update_cover_letter_text(&pool, job, "Hello").await,
            Err(AppError::NotFound(_))
        ));
    }
}
