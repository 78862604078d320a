use actix_web::{get, web, HttpRequest, Responder};
use tracing::error;

use siteforge::db;

use crate::web::helpers::{render, require_user};
use crate::web::state::AppState;
use crate::web::templates::DashboardTemplate;

const SAMPLE_SIZE: usize = 5;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard);
}

#[get("/")]
pub async fn dashboard(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }

    let template_count = db::count_page_templates(&state.pool).await.unwrap_or_else(|e| {
        error!(error = %e, "failed to count page templates");
        0
    });
    let project_count = db::count_projects(&state.pool).await.unwrap_or_else(|e| {
        error!(error = %e, "failed to count projects");
        0
    });

    let mut templates_sample = db::list_page_templates(&state.pool).await.unwrap_or_default();
    templates_sample.truncate(SAMPLE_SIZE);

    let mut projects_sample = db::list_projects(&state.pool).await.unwrap_or_default();
    projects_sample.truncate(SAMPLE_SIZE);

    render(DashboardTemplate {
        template_count,
        project_count,
        templates_sample,
        projects_sample,
    })
}
