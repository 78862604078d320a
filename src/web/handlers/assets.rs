use actix_files::NamedFile;
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use tracing::warn;
use uuid::Uuid;

use crate::web::helpers::{render_not_found, require_user};
use crate::web::state::AppState;

/// Folder names a request may address under a project's upload root.
/// Anything else 404s without touching the file system.
const SERVABLE_FOLDERS: &[&str] = &["images", "favicons", "css", "js"];

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(serve_upload);
}

#[get("/uploads/{project_id}/{folder}/{filename}")]
pub async fn serve_upload(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, String, String)>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let (project_id, folder, filename) = path.into_inner();

    if !SERVABLE_FOLDERS.contains(&folder.as_str()) {
        return render_not_found();
    }

    let full_path = match state.storage.resolve_for_serving(project_id, &folder, &filename) {
        Ok(path) => path,
        Err(e) => {
            warn!(error = %e, %filename, "rejected asset request");
            return HttpResponse::Forbidden().body("Forbidden");
        }
    };

    match NamedFile::open_async(&full_path).await {
        Ok(file) => file.into_response(&req),
        Err(_) => render_not_found(),
    }
}
