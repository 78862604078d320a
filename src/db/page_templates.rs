use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{PageTemplate, PageTemplateCreate, PageTemplateUpdate};

pub async fn list_page_templates(pool: &PgPool) -> Result<Vec<PageTemplate>, sqlx::Error> {
    sqlx::query_as::<_, PageTemplate>(
        r#"
        SELECT *
        FROM page_templates
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn count_page_templates(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(r#"SELECT count(*) FROM page_templates"#)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn get_page_template_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<PageTemplate>, sqlx::Error> {
    sqlx::query_as::<_, PageTemplate>(
        r#"
        SELECT *
        FROM page_templates
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_page_template_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<PageTemplate>, sqlx::Error> {
    sqlx::query_as::<_, PageTemplate>(
        r#"
        SELECT *
        FROM page_templates
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn create_page_template(
    pool: &PgPool,
    data: &PageTemplateCreate,
) -> Result<PageTemplate, sqlx::Error> {
    sqlx::query_as::<_, PageTemplate>(
        r#"
        INSERT INTO page_templates (name, description, html)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.html)
    .fetch_one(pool)
    .await
}

pub async fn update_page_template(
    pool: &PgPool,
    id: Uuid,
    data: &PageTemplateUpdate,
) -> Result<Option<PageTemplate>, sqlx::Error> {
    sqlx::query_as::<_, PageTemplate>(
        r#"
        UPDATE page_templates
        SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            html = COALESCE($3, html),
            edited_at = now()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(data.name.as_deref())
    .bind(data.description.as_deref())
    .bind(data.html.as_deref())
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// A template referenced by any page must not be deleted.
pub async fn page_template_in_use(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as(r#"SELECT count(*) FROM project_pages WHERE template_id = $1"#)
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub async fn delete_page_template(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM page_templates
        WHERE id = $1
          AND NOT EXISTS (SELECT 1 FROM project_pages WHERE template_id = $1)
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
