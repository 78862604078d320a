use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AssetKind, ProjectAsset, ProjectAssetCreate};

pub async fn list_assets_for_project(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<ProjectAsset>, sqlx::Error> {
    sqlx::query_as::<_, ProjectAsset>(
        r#"
        SELECT *
        FROM project_assets
        WHERE project_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn get_asset_by_stored_filename(
    pool: &PgPool,
    project_id: Uuid,
    kind: AssetKind,
    stored_filename: &str,
) -> Result<Option<ProjectAsset>, sqlx::Error> {
    sqlx::query_as::<_, ProjectAsset>(
        r#"
        SELECT *
        FROM project_assets
        WHERE project_id = $1 AND kind = $2 AND stored_filename = $3
        "#,
    )
    .bind(project_id)
    .bind(kind)
    .bind(stored_filename)
    .fetch_optional(pool)
    .await
}

pub async fn create_asset(
    pool: &PgPool,
    data: &ProjectAssetCreate,
) -> Result<ProjectAsset, sqlx::Error> {
    sqlx::query_as::<_, ProjectAsset>(
        r#"
        INSERT INTO project_assets (project_id, kind, original_filename, stored_filename)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(data.project_id)
    .bind(data.kind)
    .bind(&data.original_filename)
    .bind(&data.stored_filename)
    .fetch_one(pool)
    .await
}

pub async fn delete_asset(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM project_assets WHERE id = $1"#)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
