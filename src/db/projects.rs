use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Project, ProjectCreate, ProjectUpdate};

pub async fn list_projects(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        SELECT *
        FROM projects
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn count_projects(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(r#"SELECT count(*) FROM projects"#)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn get_project_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        SELECT *
        FROM projects
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_project_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        SELECT *
        FROM projects
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn create_project(pool: &PgPool, data: &ProjectCreate) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects
            (name, site_title, primary_color, secondary_color, accent_color, global_css)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&data.name)
    .bind(data.site_title.as_deref())
    .bind(data.primary_color.as_deref())
    .bind(data.secondary_color.as_deref())
    .bind(data.accent_color.as_deref())
    .bind(data.global_css.as_deref())
    .fetch_one(pool)
    .await
}

pub async fn update_project(
    pool: &PgPool,
    id: Uuid,
    data: &ProjectUpdate,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects
        SET
            name = $1,
            site_title = $2,
            primary_color = $3,
            secondary_color = $4,
            accent_color = $5,
            global_css = $6,
            edited_at = now()
        WHERE id = $7
        RETURNING *
        "#,
    )
    .bind(&data.name)
    .bind(data.site_title.as_deref())
    .bind(data.primary_color.as_deref())
    .bind(data.secondary_color.as_deref())
    .bind(data.accent_color.as_deref())
    .bind(data.global_css.as_deref())
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn set_project_favicon(
    pool: &PgPool,
    id: Uuid,
    stored_filename: Option<&str>,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects
        SET favicon_filename = $1, edited_at = now()
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(stored_filename)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Owned pages, assets and navbar items cascade at the schema level.
pub async fn delete_project(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM projects WHERE id = $1"#)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
