use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use tracing::error;
use uuid::Uuid;

use siteforge::db;
use siteforge::render::{render_page, RenderMode};

use crate::web::helpers::{render_not_found, require_user, see_other};
use crate::web::state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(preview_page);
}

/// Renders a page exactly as the export would, except asset URLs point
/// at the running service instead of the archive's relative folders.
#[get("/preview/pages/{page_id}")]
pub async fn preview_page(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let page_id = path.into_inner();

    let page = match db::get_page_by_id(&state.pool, page_id).await {
        Ok(Some(page)) => page,
        Ok(None) => return render_not_found(),
        Err(e) => {
            error!(error = %e, "failed to load page for preview");
            return see_other("/projects?error=db");
        }
    };

    let project = match db::get_project_by_id(&state.pool, page.project_id).await {
        Ok(Some(project)) => project,
        Ok(None) => return render_not_found(),
        Err(e) => {
            error!(error = %e, "failed to load project for preview");
            return see_other("/projects?error=db");
        }
    };

    let template = match db::get_page_template_by_id(&state.pool, page.template_id).await {
        Ok(template) => template,
        Err(e) => {
            error!(error = %e, "failed to load template for preview");
            return see_other(&format!("/projects/{}/pages?error=db", project.id));
        }
    };

    let Some(template) = template else {
        return HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(
                "<p>This page's template no longer exists; pick a new one in the page \
                 settings before previewing.</p>",
            );
    };

    let navbar = match db::list_navbar_links(&state.pool, project.id).await {
        Ok(navbar) => navbar,
        Err(e) => {
            error!(error = %e, "failed to load navbar for preview");
            Vec::new()
        }
    };

    let html = render_page(
        &template.html,
        &page.content,
        Some(&project),
        Some(&page),
        &navbar,
        RenderMode::Preview,
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
