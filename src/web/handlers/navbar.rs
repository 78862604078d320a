use std::collections::HashMap;

use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use tracing::error;
use uuid::Uuid;

use siteforge::db;
use siteforge::models::{NavbarItem, NavbarItemCreate, Project, ProjectPage};

use crate::web::helpers::{render, render_not_found, require_user, see_other};
use crate::web::state::AppState;
use crate::web::templates::{NavbarFormTemplate, NavbarRow};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(navbar_form).service(save_navbar);
}

/// One row per project page. Pages already in the navbar keep their
/// saved link text and position; the rest default to the page title
/// and the end of the list.
fn navbar_rows(pages: &[ProjectPage], items: &[NavbarItem]) -> Vec<NavbarRow> {
    let by_page: HashMap<Uuid, &NavbarItem> = items.iter().map(|i| (i.page_id, i)).collect();
    let next_position = items.iter().map(|i| i.position).max().unwrap_or(0) + 1;

    pages
        .iter()
        .enumerate()
        .map(|(idx, page)| match by_page.get(&page.id) {
            Some(item) => NavbarRow {
                page_id: page.id.to_string(),
                title: page.title.clone(),
                in_navbar: true,
                link_text: item.link_text.clone(),
                position: item.position,
            },
            None => NavbarRow {
                page_id: page.id.to_string(),
                title: page.title.clone(),
                in_navbar: false,
                link_text: page.title.clone(),
                position: next_position + idx as i32,
            },
        })
        .collect()
}

async fn load_navbar_state(
    state: &AppState,
    project_id: Uuid,
) -> Result<(Project, Vec<ProjectPage>, Vec<NavbarItem>), HttpResponse> {
    let project = match db::get_project_by_id(&state.pool, project_id).await {
        Ok(Some(project)) => project,
        Ok(None) => return Err(render_not_found()),
        Err(e) => {
            error!(error = %e, "failed to load project");
            return Err(see_other("/projects?error=db"));
        }
    };

    let pages = match db::list_pages_for_project(&state.pool, project.id).await {
        Ok(pages) => pages,
        Err(e) => {
            error!(error = %e, "failed to list pages");
            return Err(see_other("/projects?error=db"));
        }
    };

    let items = match db::list_navbar_items(&state.pool, project.id).await {
        Ok(items) => items,
        Err(e) => {
            error!(error = %e, "failed to list navbar items");
            return Err(see_other("/projects?error=db"));
        }
    };

    Ok((project, pages, items))
}

#[get("/projects/{project_id}/navbar")]
pub async fn navbar_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let (project, pages, items) = match load_navbar_state(&state, path.into_inner()).await {
        Ok(loaded) => loaded,
        Err(resp) => return resp,
    };

    render(NavbarFormTemplate {
        rows: navbar_rows(&pages, &items),
        project,
        error: String::new(),
        success: String::new(),
    })
}

#[post("/projects/{project_id}/navbar")]
pub async fn save_navbar(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    form: web::Form<HashMap<String, String>>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let (project, pages, _) = match load_navbar_state(&state, path.into_inner()).await {
        Ok(loaded) => loaded,
        Err(resp) => return resp,
    };

    // Checkbox naming: `page_in_navbar_<id>` present means included,
    // with `link_text_<id>` and `order_<id>` alongside.
    let mut selected: Vec<NavbarItemCreate> = Vec::new();
    for page in &pages {
        if !form.contains_key(&format!("page_in_navbar_{}", page.id)) {
            continue;
        }

        let link_text = form
            .get(&format!("link_text_{}", page.id))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(&page.title)
            .to_string();

        let position = form
            .get(&format!("order_{}", page.id))
            .and_then(|s| s.trim().parse::<i32>().ok())
            .unwrap_or(0);

        selected.push(NavbarItemCreate {
            project_id: project.id,
            page_id: page.id,
            link_text,
            position,
        });
    }

    selected.sort_by_key(|item| item.position);

    let (error, success) = match db::replace_navbar_items(&state.pool, project.id, &selected).await
    {
        Ok(()) => (String::new(), "Navbar saved".to_string()),
        Err(e) => {
            error!(error = %e, project_id = %project.id, "failed to replace navbar items");
            ("Database error. Please try again.".to_string(), String::new())
        }
    };

    let items = db::list_navbar_items(&state.pool, project.id).await.unwrap_or_default();

    render(NavbarFormTemplate {
        rows: navbar_rows(&pages, &items),
        project,
        error,
        success,
    })
}
