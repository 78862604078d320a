use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NavbarItem, NavbarItemCreate, NavbarLink};

pub async fn list_navbar_items(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<NavbarItem>, sqlx::Error> {
    sqlx::query_as::<_, NavbarItem>(
        r#"
        SELECT *
        FROM navbar_items
        WHERE project_id = $1
        ORDER BY position ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Navbar entries joined with their page slugs, in display order.
/// This is the shape the renderer consumes.
pub async fn list_navbar_links(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<NavbarLink>, sqlx::Error> {
    sqlx::query_as::<_, NavbarLink>(
        r#"
        SELECT n.link_text, n.position, p.slug
        FROM navbar_items n
        JOIN project_pages p ON n.page_id = p.id
        WHERE n.project_id = $1
        ORDER BY n.position ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// The management form fully replaces a project's navbar: everything
/// is deleted and the selected entries re-inserted in one transaction,
/// so a failed save never leaves a half-patched set.
pub async fn replace_navbar_items(
    pool: &PgPool,
    project_id: Uuid,
    items: &[NavbarItemCreate],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(r#"DELETE FROM navbar_items WHERE project_id = $1"#)
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    for item in items {
        sqlx::query(
            r#"
            INSERT INTO navbar_items (project_id, page_id, link_text, position)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(item.project_id)
        .bind(item.page_id)
        .bind(&item.link_text)
        .bind(item.position)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}
