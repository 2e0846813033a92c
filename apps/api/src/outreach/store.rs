use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::outreach::OutreachContactRow;
use crate::outreach::{CreateContactRequest, UpdateContactRequest};

fn contact_not_found() -> AppError {
    AppError::NotFound("Contact not found".to_string())
}

pub async fn fetch_owned_contact(
    pool: &PgPool,
    user_id: Uuid,
    contact_id: Uuid,
) -> Result<OutreachContactRow, AppError> {
    sqlx::query_as::<_, OutreachContactRow>(
        "SELECT * FROM outreach_contacts WHERE id = $1 AND user_id = $2",
    )
    .bind(contact_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(contact_not_found)
}

pub async fn insert_contact(
    pool: &PgPool,
    user_id: Uuid,
    req: &CreateContactRequest,
) -> Result<OutreachContactRow, AppError> {
    let row = sqlx::query_as::<_, OutreachContactRow>(
        r#"
        INSERT INTO outreach_contacts (user_id, job_id, name, linkedin_url, role, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(req.job_id)
    .bind(req.name.trim())
    .bind(req.linkedin_url.as_deref().map(str::trim))
    .bind(req.role.as_deref())
    .bind(req.notes.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn list_contacts(
    pool: &PgPool,
    user_id: Uuid,
    job_id: Option<Uuid>,
) -> Result<Vec<OutreachContactRow>, AppError> {
    let rows = sqlx::query_as::<_, OutreachContactRow>(
        r#"
        SELECT * FROM outreach_contacts
        WHERE user_id = $1 AND ($2::uuid IS NULL OR job_id = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(job_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Applies the fields present in `req`. `mark_contacted` stamps
/// `last_contacted_at` in the same statement.
pub async fn update_contact(
    pool: &PgPool,
    user_id: Uuid,
    contact_id: Uuid,
    req: &UpdateContactRequest,
    mark_contacted: bool,
) -> Result<OutreachContactRow, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE outreach_contacts SET updated_at = now()");

    if let Some(name) = &req.name {
        qb.push(", name = ").push_bind(name.trim().to_string());
    }
    if let Some(linkedin_url) = &req.linkedin_url {
        qb.push(", linkedin_url = ")
            .push_bind(linkedin_url.as_deref().map(|s| s.trim().to_string()));
    }
    if let Some(role) = &req.role {
        qb.push(", role = ").push_bind(role.clone());
    }
    if let Some(status) = req.status {
        qb.push(", status = ").push_bind(status.as_str());
    }
    if let Some(notes) = &req.notes {
        qb.push(", notes = ").push_bind(notes.clone());
    }
    if mark_contacted {
        qb.push(", last_contacted_at = now()");
    }

    qb.push(" WHERE id = ")
        .push_bind(contact_id)
        .push(" AND user_id = ")
        .push_bind(user_id)
        .push(" RETURNING *");

    qb.build_query_as::<OutreachContactRow>()
        .fetch_optional(pool)
        .await?
        .ok_or_else(contact_not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vocab::ContactStatus;

    async fn seed_user(pool: &PgPool) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2)")
            .bind(id)
            .bind(format!("{id}@example.com"))
            .execute(pool)
            .await
            .unwrap();
        id
    }

    fn create_request(name: &str, job_id: Option<Uuid>) -> CreateContactRequest {
        CreateContactRequest {
            job_id,
            name: name.to_string(),
            linkedin_url: Some("https://www.linkedin.com/in/dana".to_string()),
            role: Some("Recruiter".to_string()),
            notes: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_reached_out_stamps_last_contacted(pool: PgPool) {
        let user = seed_user(&pool).await;
        let contact = insert_contact(&pool, user, &create_request("Dana", None)).await.unwrap();
        assert_eq!(contact.status, ContactStatus::NotContacted);
        assert!(contact.last_contacted_at.is_none());

        let patch = UpdateContactRequest {
            status: Some(ContactStatus::ReachedOut),
            ..Default::default()
        };
        let updated = update_contact(&pool, user, contact.id, &patch, true).await.unwrap();
        assert_eq!(updated.status, ContactStatus::ReachedOut);
        assert!(updated.last_contacted_at.is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_list_filters_by_job_and_owner(pool: PgPool) {
        let user = seed_user(&pool).await;
        let other = seed_user(&pool).await;
        let job: Uuid = sqlx::query_scalar(
            "INSERT INTO jobs (user_id, title, company, jd_raw) VALUES ($1, 'SWE', 'Acme', 'x') RETURNING id",
        )
        .bind(user)
        .fetch_one(&pool)
        .await
        .unwrap();

        insert_contact(&pool, user, &create_request("Dana", Some(job))).await.unwrap();
        insert_contact(&pool, user, &create_request("Sam", None)).await.unwrap();
        insert_contact(&pool, other, &create_request("Lee", None)).await.unwrap();

        assert_eq!(list_contacts(&pool, user, None).await.unwrap().len(), 2);
        let for_job = list_contacts(&pool, user, Some(job)).await.unwrap();
        assert_eq!(for_job.len(), 1);
        assert_eq!(for_job[0].name, "Dana");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_foreign_contact_is_not_found(pool: PgPool) {
        let owner = seed_user(&pool).await;
        let other = seed_user(&pool).await;
        let contact = insert_contact(&pool, owner, &create_request("Dana", None)).await.unwrap();
        assert!(matches!(
            fetch_owned_contact(&pool, other, contact.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
