use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use tracing::{error, warn};
use uuid::Uuid;

use siteforge::db;
use siteforge::models::{
    is_valid_hex_color, AssetKind, Project, ProjectAssetCreate, ProjectCreate, ProjectUpdate,
};
use siteforge::render::paths;
use siteforge::services::storage::generate_stored_filename;
use siteforge::services::Storage;

use crate::web::forms::NoticeQuery;
use crate::web::helpers::{
    is_unique_violation, render, render_not_found, require_user, see_other,
};
use crate::web::state::AppState;
use crate::web::templates::{ProjectFormTemplate, ProjectsListTemplate};
use crate::web::uploads::{read_mixed_form, MixedForm, UploadedFile};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_projects)
        .service(new_project_form)
        .service(create_project)
        .service(edit_project_form)
        .service(update_project)
        .service(delete_project);
}

fn list_error_message(code: &str) -> String {
    match code {
        "favicon_type" => {
            "Project saved, but the favicon was ignored: unsupported file type".to_string()
        }
        "db" => "Database error. Please try again.".to_string(),
        other => other.to_string(),
    }
}

/// Trimmed text field, with the empty string collapsed to `None` so
/// clearing an input clears the column.
fn optional_text(form: &MixedForm, name: &str) -> Option<String> {
    form.text(name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_invalid_color(colors: &[&Option<String>]) -> Option<String> {
    colors
        .iter()
        .filter_map(|c| c.as_deref())
        .find(|c| !is_valid_hex_color(c))
        .map(str::to_string)
}

fn form_template(legend: &str, action: &str, form: &MixedForm, error: String) -> HttpResponse {
    render(ProjectFormTemplate {
        legend: legend.to_string(),
        action: action.to_string(),
        name: form.text("name").unwrap_or_default().trim().to_string(),
        site_title: form.text("site_title").unwrap_or_default().to_string(),
        primary_color: form.text("primary_color").unwrap_or_default().to_string(),
        secondary_color: form.text("secondary_color").unwrap_or_default().to_string(),
        accent_color: form.text("accent_color").unwrap_or_default().to_string(),
        global_css: form.text("global_css").unwrap_or_default().to_string(),
        favicon_filename: String::new(),
        error,
    })
}

/// Stores an uploaded favicon on disk, records it as an asset and
/// points the project at it. Returns false when the file type is not
/// allowed, so the caller can surface a warning.
async fn attach_favicon(
    pool: &PgPool,
    storage: &Storage,
    project: &Project,
    upload: &UploadedFile,
) -> Result<bool, HttpResponse> {
    let Some(stored_filename) = generate_stored_filename(&upload.original_filename, Some("favicon"))
    else {
        warn!(
            project_id = %project.id,
            filename = %upload.original_filename,
            "rejected favicon upload with unsupported file type"
        );
        return Ok(false);
    };

    let folder = paths::disk_folder(AssetKind::Favicon).unwrap_or("favicons");
    if let Err(e) = storage.save(project.id, folder, &stored_filename, &upload.bytes) {
        error!(error = %e, project_id = %project.id, "failed to store favicon");
        return Err(see_other("/projects?error=db"));
    }

    let asset = ProjectAssetCreate {
        project_id: project.id,
        kind: AssetKind::Favicon,
        original_filename: upload.original_filename.clone(),
        stored_filename: stored_filename.clone(),
    };
    if let Err(e) = db::create_asset(pool, &asset).await {
        error!(error = %e, project_id = %project.id, "failed to record favicon asset");
        return Err(see_other("/projects?error=db"));
    }

    // The previous favicon's file and asset row are no longer
    // reachable once the pointer moves, so clean them up first.
    if let Some(old) = project.favicon_filename.as_deref() {
        if let Err(e) = storage.delete(project.id, folder, old) {
            warn!(error = %e, project_id = %project.id, "failed to delete old favicon file");
        }
        match db::get_asset_by_stored_filename(pool, project.id, AssetKind::Favicon, old).await {
            Ok(Some(old_asset)) => {
                if let Err(e) = db::delete_asset(pool, old_asset.id).await {
                    warn!(error = %e, asset_id = %old_asset.id, "failed to delete old favicon asset");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to look up old favicon asset"),
        }
    }

    if let Err(e) = db::set_project_favicon(pool, project.id, Some(&stored_filename)).await {
        error!(error = %e, project_id = %project.id, "failed to point project at new favicon");
        return Err(see_other("/projects?error=db"));
    }

    Ok(true)
}

#[get("/projects")]
pub async fn list_projects(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<NoticeQuery>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }

    let projects = match db::list_projects(&state.pool).await {
        Ok(projects) => projects,
        Err(e) => {
            error!(error = %e, "failed to list projects");
            Vec::new()
        }
    };

    render(ProjectsListTemplate {
        projects,
        error: query.error.as_deref().map(list_error_message).unwrap_or_default(),
    })
}

#[get("/projects/new")]
pub async fn new_project_form(req: HttpRequest) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }

    render(ProjectFormTemplate {
        legend: "New website project".to_string(),
        action: "/projects/new".to_string(),
        name: String::new(),
        site_title: String::new(),
        primary_color: String::new(),
        secondary_color: String::new(),
        accent_color: String::new(),
        global_css: String::new(),
        favicon_filename: String::new(),
        error: String::new(),
    })
}

#[post("/projects/new")]
pub async fn create_project(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }

    let form = match read_mixed_form(payload).await {
        Ok(form) => form,
        Err(e) => {
            error!(error = %e, "failed to read project form");
            return see_other("/projects?error=db");
        }
    };

    let name = form.text("name").unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return form_template(
            "New website project",
            "/projects/new",
            &form,
            "Project name is required".to_string(),
        );
    }

    let data = ProjectCreate {
        name: name.clone(),
        site_title: optional_text(&form, "site_title"),
        primary_color: optional_text(&form, "primary_color"),
        secondary_color: optional_text(&form, "secondary_color"),
        accent_color: optional_text(&form, "accent_color"),
        global_css: optional_text(&form, "global_css"),
    };

    if let Some(bad) = first_invalid_color(&[
        &data.primary_color,
        &data.secondary_color,
        &data.accent_color,
    ]) {
        return form_template(
            "New website project",
            "/projects/new",
            &form,
            format!("\"{}\" is not a valid hex color (expected e.g. #1a2b3c)", bad),
        );
    }

    let project = match db::create_project(&state.pool, &data).await {
        Ok(project) => project,
        Err(e) if is_unique_violation(&e) => {
            return form_template(
                "New website project",
                "/projects/new",
                &form,
                format!("A project named \"{}\" already exists", name),
            );
        }
        Err(e) => {
            error!(error = %e, "failed to create project");
            return form_template(
                "New website project",
                "/projects/new",
                &form,
                "Database error. Please try again.".to_string(),
            );
        }
    };

    if let Some(upload) = form.file("favicon") {
        match attach_favicon(&state.pool, &state.storage, &project, upload).await {
            Ok(true) => {}
            Ok(false) => return see_other("/projects?error=favicon_type"),
            Err(resp) => return resp,
        }
    }

    see_other("/projects")
}

#[get("/projects/{id}/edit")]
pub async fn edit_project_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let id = path.into_inner();

    match db::get_project_by_id(&state.pool, id).await {
        Ok(Some(project)) => render(ProjectFormTemplate {
            legend: format!("Edit project \"{}\"", project.name),
            action: format!("/projects/{}/edit", project.id),
            name: project.name,
            site_title: project.site_title.unwrap_or_default(),
            primary_color: project.primary_color.unwrap_or_default(),
            secondary_color: project.secondary_color.unwrap_or_default(),
            accent_color: project.accent_color.unwrap_or_default(),
            global_css: project.global_css.unwrap_or_default(),
            favicon_filename: project.favicon_filename.unwrap_or_default(),
            error: String::new(),
        }),
        Ok(None) => render_not_found(),
        Err(e) => {
            error!(error = %e, "failed to load project");
            see_other("/projects?error=db")
        }
    }
}

#[post("/projects/{id}/edit")]
pub async fn update_project(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let id = path.into_inner();
    let action = format!("/projects/{}/edit", id);

    let form = match read_mixed_form(payload).await {
        Ok(form) => form,
        Err(e) => {
            error!(error = %e, "failed to read project form");
            return see_other("/projects?error=db");
        }
    };

    let name = form.text("name").unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return form_template(
            "Edit project",
            &action,
            &form,
            "Project name is required".to_string(),
        );
    }

    let data = ProjectUpdate {
        name: name.clone(),
        site_title: optional_text(&form, "site_title"),
        primary_color: optional_text(&form, "primary_color"),
        secondary_color: optional_text(&form, "secondary_color"),
        accent_color: optional_text(&form, "accent_color"),
        global_css: optional_text(&form, "global_css"),
    };

    if let Some(bad) = first_invalid_color(&[
        &data.primary_color,
        &data.secondary_color,
        &data.accent_color,
    ]) {
        return form_template(
            "Edit project",
            &action,
            &form,
            format!("\"{}\" is not a valid hex color (expected e.g. #1a2b3c)", bad),
        );
    }

    let project = match db::update_project(&state.pool, id, &data).await {
        Ok(Some(project)) => project,
        Ok(None) => return render_not_found(),
        Err(e) if is_unique_violation(&e) => {
            return form_template(
                "Edit project",
                &action,
                &form,
                format!("A project named \"{}\" already exists", name),
            );
        }
        Err(e) => {
            error!(error = %e, "failed to update project");
            return form_template(
                "Edit project",
                &action,
                &form,
                "Database error. Please try again.".to_string(),
            );
        }
    };

    if let Some(upload) = form.file("favicon") {
        match attach_favicon(&state.pool, &state.storage, &project, upload).await {
            Ok(true) => {}
            Ok(false) => return see_other("/projects?error=favicon_type"),
            Err(resp) => return resp,
        }
    }

    see_other("/projects")
}

#[post("/projects/{id}/delete")]
pub async fn delete_project(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let id = path.into_inner();

    match db::delete_project(&state.pool, id).await {
        Ok(true) => {
            if let Err(e) = state.storage.remove_project_files(id) {
                // The row is gone; orphaned files are only noise.
                warn!(error = %e, project_id = %id, "failed to remove project upload folder");
            }
            see_other("/projects")
        }
        Ok(false) => render_not_found(),
        Err(e) => {
            error!(error = %e, "failed to delete project");
            see_other("/projects?error=db")
        }
    }
}
