use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ProjectPage, ProjectPageCreate, ProjectPageUpdate};

pub async fn list_pages_for_project(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<ProjectPage>, sqlx::Error> {
    sqlx::query_as::<_, ProjectPage>(
        r#"
        SELECT *
        FROM project_pages
        WHERE project_id = $1
        ORDER BY title ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn get_page_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ProjectPage>, sqlx::Error> {
    sqlx::query_as::<_, ProjectPage>(
        r#"
        SELECT *
        FROM project_pages
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Scoped lookup so handlers can't cross project boundaries through
/// a guessed page id.
pub async fn get_page_in_project(
    pool: &PgPool,
    project_id: Uuid,
    page_id: Uuid,
) -> Result<Option<ProjectPage>, sqlx::Error> {
    sqlx::query_as::<_, ProjectPage>(
        r#"
        SELECT *
        FROM project_pages
        WHERE id = $1 AND project_id = $2
        "#,
    )
    .bind(page_id)
    .bind(project_id)
    .fetch_optional(pool)
    .await
}

pub async fn slug_taken(
    pool: &PgPool,
    project_id: Uuid,
    slug: &str,
    exclude_page: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT count(*)
        FROM project_pages
        WHERE project_id = $1 AND slug = $2 AND ($3::uuid IS NULL OR id <> $3)
        "#,
    )
    .bind(project_id)
    .bind(slug)
    .bind(exclude_page)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

pub async fn create_page(
    pool: &PgPool,
    data: &ProjectPageCreate,
) -> Result<ProjectPage, sqlx::Error> {
    sqlx::query_as::<_, ProjectPage>(
        r#"
        INSERT INTO project_pages (project_id, template_id, title, slug)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(data.project_id)
    .bind(data.template_id)
    .bind(&data.title)
    .bind(&data.slug)
    .fetch_one(pool)
    .await
}

pub async fn update_page_settings(
    pool: &PgPool,
    id: Uuid,
    data: &ProjectPageUpdate,
) -> Result<Option<ProjectPage>, sqlx::Error> {
    sqlx::query_as::<_, ProjectPage>(
        r#"
        UPDATE project_pages
        SET
            template_id = COALESCE($1, template_id),
            title = COALESCE($2, title),
            slug = COALESCE($3, slug),
            edited_at = now()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(data.template_id)
    .bind(data.title.as_deref())
    .bind(data.slug.as_deref())
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn update_page_content(
    pool: &PgPool,
    id: Uuid,
    content: &HashMap<String, String>,
) -> Result<Option<ProjectPage>, sqlx::Error> {
    sqlx::query_as::<_, ProjectPage>(
        r#"
        UPDATE project_pages
        SET content = $1, edited_at = now()
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(Json(content))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_page(pool: &PgPool, project_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM project_pages WHERE id = $1 AND project_id = $2"#)
        .bind(id)
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
