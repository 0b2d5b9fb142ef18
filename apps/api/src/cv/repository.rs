use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::cv::{CvRow, CvStatus};
use crate::models::organization::OrganizationRow;
use crate::models::template::TemplateRow;

pub struct NewCv<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_filename: &'a str,
    pub storage_key: &'a str,
    pub parsed_data: Option<Value>,
    pub parse_error: Option<String>,
}

pub async fn insert_cv(pool: &PgPool, cv: NewCv<'_>) -> Result<CvRow, sqlx::Error> {
    sqlx::query_as::<_, CvRow>(
        r#"
        INSERT INTO cvs (id, user_id, original_filename, storage_key, status, parsed_data, parse_error)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(cv.id)
    .bind(cv.user_id)
    .bind(cv.original_filename)
    .bind(cv.storage_key)
    .bind(CvStatus::Processing.as_str())
    .bind(cv.parsed_data)
    .bind(cv.parse_error)
    .fetch_one(pool)
    .await
}

pub async fn list_cvs(pool: &PgPool, user_id: Uuid) -> Result<Vec<CvRow>, sqlx::Error> {
    sqlx::query_as::<_, CvRow>(
        "SELECT * FROM cvs WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_cv(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<CvRow>, sqlx::Error> {
    sqlx::query_as::<_, CvRow>("SELECT * FROM cvs WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Replaces structured data wholesale; the previous value is not merged.
pub async fn replace_parsed_data(
    pool: &PgPool,
    id: Uuid,
    parsed_data: Option<Value>,
    parse_error: Option<String>,
) -> Result<CvRow, sqlx::Error> {
    sqlx::query_as::<_, CvRow>(
        r#"
        UPDATE cvs
        SET parsed_data = $2, parse_error = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(parsed_data)
    .bind(parse_error)
    .fetch_one(pool)
    .await
}

/// Returns `false` when no CV with that id belongs to the user.
pub async fn set_status(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    status: CvStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE cvs SET status = $1, updated_at = NOW() WHERE id = $2 AND user_id = $3",
    )
    .bind(status.as_str())
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_cv(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<CvRow>, sqlx::Error> {
    sqlx::query_as::<_, CvRow>("DELETE FROM cvs WHERE id = $1 AND user_id = $2 RETURNING *")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// The requested template, or the user's default when `template_id` is `None`.
pub async fn find_template(
    pool: &PgPool,
    user_id: Uuid,
    template_id: Option<Uuid>,
) -> Result<Option<TemplateRow>, sqlx::Error> {
    match template_id {
        Some(id) => {
            sqlx::query_as::<_, TemplateRow>(
                "SELECT * FROM templates WHERE id = $1 AND user_id = $2",
            )
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, TemplateRow>(
                r#"
                SELECT * FROM templates
                WHERE user_id = $1
                ORDER BY is_default DESC, created_at DESC
                LIMIT 1
                "#,
            )
            .bind(user_id)
            .fetch_optional(pool)
            .await
        }
    }
}

pub async fn find_organization(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<OrganizationRow>, sqlx::Error> {
    sqlx::query_as::<_, OrganizationRow>(
        "SELECT * FROM organizations WHERE user_id = $1 ORDER BY created_at LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
