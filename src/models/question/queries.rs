use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use super::types::*;

const SELECT_COLUMNS: &str = "SELECT id, name, email, current_role_field, target_role, \
                                     years_experience, skills, question, session_id, status, \
                                     admin_response, file_name, file_type, file_size, file_url, \
                                     created_at, answered_at \
                              FROM questions";

/// Insert a new pending question, returning its id.
pub async fn create(pool: &PgPool, new: &NewQuestion) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO questions \
             (name, email, current_role_field, target_role, years_experience, skills, \
              question, session_id, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending') \
         RETURNING id",
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.current_role_field)
    .bind(&new.target_role)
    .bind(&new.years_experience)
    .bind(&new.skills)
    .bind(&new.question)
    .bind(&new.session_id)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Link stored file metadata to an existing question (all four columns at once).
pub async fn attach_file(pool: &PgPool, id: i64, attachment: &Attachment) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE questions \
         SET file_name = $2, file_type = $3, file_size = $4, file_url = $5 \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&attachment.file_name)
    .bind(&attachment.file_type)
    .bind(attachment.file_size)
    .bind(&attachment.file_url)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// All questions, most recent first.
pub async fn find_all(pool: &PgPool) -> Result<Vec<Question>, AppError> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query_as::<_, QuestionRow>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Question::from).collect())
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Question>, AppError> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
    let row = sqlx::query_as::<_, QuestionRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(Question::from))
}

/// Save an operator response and mark the question answered.
/// Returns the updated question, or `None` when no row has that id.
/// A question that is already answered gets its response overwritten.
pub async fn respond(pool: &PgPool, id: i64, response: &str) -> Result<Option<Question>, AppError> {
    let sql = "UPDATE questions \
               SET admin_response = $2, status = 'answered', answered_at = now() \
               WHERE id = $1 \
               RETURNING id, name, email, current_role_field, target_role, \
                         years_experience, skills, question, session_id, status, \
                         admin_response, file_name, file_type, file_size, file_url, \
                         created_at, answered_at";
    let row = sqlx::query_as::<_, QuestionRow>(sql)
        .bind(id)
        .bind(response)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(Question::from))
}

/// Number of questions a browser session created at or after `since`.
pub async fn count_for_session_since(
    pool: &PgPool,
    session_id: &str,
    since: DateTime<Utc>,
) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM questions WHERE session_id = $1 AND created_at >= $2",
    )
    .bind(session_id)
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
