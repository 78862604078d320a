use std::collections::HashMap;

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use tracing::{error, info};
use uuid::Uuid;

use siteforge::db;
use siteforge::render::{export_project_zip, ExportPage};

use crate::web::helpers::{render_not_found, require_user, see_other};
use crate::web::state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(export_project);
}

/// Bundles every page and uploaded asset of a project into a zip the
/// browser downloads. Pages render in export mode so all asset URLs
/// are relative and the bundle works from a plain file system.
#[get("/projects/{project_id}/export")]
pub async fn export_project(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let project_id = path.into_inner();

    let project = match db::get_project_by_id(&state.pool, project_id).await {
        Ok(Some(project)) => project,
        Ok(None) => return render_not_found(),
        Err(e) => {
            error!(error = %e, "failed to load project for export");
            return see_other("/projects?error=db");
        }
    };

    let pages = match db::list_pages_for_project(&state.pool, project.id).await {
        Ok(pages) => pages,
        Err(e) => {
            error!(error = %e, "failed to list pages for export");
            return see_other("/projects?error=db");
        }
    };

    // Pages often share a template; fetch each one once.
    let mut template_html: HashMap<Uuid, Option<String>> = HashMap::new();
    for page in &pages {
        if template_html.contains_key(&page.template_id) {
            continue;
        }
        let html = match db::get_page_template_by_id(&state.pool, page.template_id).await {
            Ok(template) => template.map(|t| t.html),
            Err(e) => {
                error!(error = %e, "failed to load template for export");
                return see_other("/projects?error=db");
            }
        };
        template_html.insert(page.template_id, html);
    }

    let export_pages: Vec<ExportPage> = pages
        .into_iter()
        .map(|page| ExportPage {
            template_html: template_html.get(&page.template_id).cloned().flatten(),
            page,
        })
        .collect();

    let navbar = match db::list_navbar_links(&state.pool, project.id).await {
        Ok(navbar) => navbar,
        Err(e) => {
            error!(error = %e, "failed to load navbar for export");
            return see_other("/projects?error=db");
        }
    };

    let assets = match db::list_assets_for_project(&state.pool, project.id).await {
        Ok(assets) => assets,
        Err(e) => {
            error!(error = %e, "failed to list assets for export");
            return see_other("/projects?error=db");
        }
    };

    let bytes = match export_project_zip(
        &project,
        &export_pages,
        &navbar,
        &assets,
        state.storage.root(),
    ) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, project_id = %project.id, "failed to build export archive");
            return see_other("/projects?error=db");
        }
    };

    let mut stem = slug::slugify(&project.name);
    if stem.is_empty() {
        stem = "website".to_string();
    }
    let filename = format!("{}_export.zip", stem);

    info!(
        project_id = %project.id,
        %filename,
        size = bytes.len(),
        "exported project archive"
    );

    HttpResponse::Ok()
        .content_type("application/zip")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes)
}
