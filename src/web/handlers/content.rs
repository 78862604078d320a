use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpRequest, Responder};
use tracing::{error, warn};
use uuid::Uuid;

use siteforge::db;
use siteforge::models::{AssetKind, ProjectAssetCreate, ProjectPage};
use siteforge::render::paths;
use siteforge::render::{extract_placeholders, is_image_key};
use siteforge::services::storage::generate_stored_filename;

use crate::web::helpers::{render, render_not_found, require_user, see_other};
use crate::web::state::AppState;
use crate::web::templates::{ContentField, ContentFormTemplate};
use crate::web::uploads::read_mixed_form;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(content_form).service(save_content);
}

/// The editor's input rows come from the template's current HTML, so a
/// template edit immediately adds or retires fields here. Values come
/// from whatever the page last saved; keys the template dropped simply
/// stop being shown.
fn content_fields(placeholders: &[String], content: &HashMap<String, String>) -> Vec<ContentField> {
    placeholders
        .iter()
        .map(|key| ContentField {
            key: key.clone(),
            file_input_name: format!("{}_file", key),
            value: content.get(key).cloned().unwrap_or_default(),
            is_image: is_image_key(key),
        })
        .collect()
}

struct ContentTarget {
    project: siteforge::models::Project,
    page: ProjectPage,
    template_html: Option<String>,
}

async fn load_target(
    state: &AppState,
    project_id: Uuid,
    page_id: Uuid,
) -> Result<ContentTarget, actix_web::HttpResponse> {
    let project = match db::get_project_by_id(&state.pool, project_id).await {
        Ok(Some(project)) => project,
        Ok(None) => return Err(render_not_found()),
        Err(e) => {
            error!(error = %e, "failed to load project");
            return Err(see_other("/projects?error=db"));
        }
    };

    let page = match db::get_page_in_project(&state.pool, project.id, page_id).await {
        Ok(Some(page)) => page,
        Ok(None) => return Err(render_not_found()),
        Err(e) => {
            error!(error = %e, "failed to load page");
            return Err(see_other(&format!("/projects/{}/pages?error=db", project.id)));
        }
    };

    let template_html = match db::get_page_template_by_id(&state.pool, page.template_id).await {
        Ok(template) => template.map(|t| t.html),
        Err(e) => {
            error!(error = %e, "failed to load template");
            return Err(see_other(&format!("/projects/{}/pages?error=db", project.id)));
        }
    };

    Ok(ContentTarget {
        project,
        page,
        template_html,
    })
}

#[get("/projects/{project_id}/pages/{page_id}/content")]
pub async fn content_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let (project_id, page_id) = path.into_inner();
    let target = match load_target(&state, project_id, page_id).await {
        Ok(target) => target,
        Err(resp) => return resp,
    };

    let (fields, error) = match target.template_html.as_deref() {
        Some(html) => {
            let placeholders = extract_placeholders(html);
            (content_fields(&placeholders, &target.page.content), String::new())
        }
        None => (
            Vec::new(),
            "This page's template no longer exists; pick a new one in the page settings"
                .to_string(),
        ),
    };

    render(ContentFormTemplate {
        project: target.project,
        page: target.page,
        fields,
        error,
        success: String::new(),
    })
}

#[post("/projects/{project_id}/pages/{page_id}/content")]
pub async fn save_content(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    payload: Multipart,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let (project_id, page_id) = path.into_inner();
    let target = match load_target(&state, project_id, page_id).await {
        Ok(target) => target,
        Err(resp) => return resp,
    };

    let Some(template_html) = target.template_html.as_deref() else {
        return render(ContentFormTemplate {
            project: target.project,
            page: target.page,
            fields: Vec::new(),
            error: "This page's template no longer exists; pick a new one in the page settings"
                .to_string(),
            success: String::new(),
        });
    };

    let form = match read_mixed_form(payload).await {
        Ok(form) => form,
        Err(e) => {
            error!(error = %e, "failed to read content form");
            return see_other(&format!(
                "/projects/{}/pages?error=db",
                target.project.id
            ));
        }
    };

    let placeholders = extract_placeholders(template_html);
    let image_folder = paths::disk_folder(AssetKind::Image).unwrap_or("images");
    let mut content: HashMap<String, String> = HashMap::new();
    let mut warning = String::new();

    for key in &placeholders {
        let previous = target.page.content.get(key).cloned().unwrap_or_default();
        let typed = form.text(key).map(str::to_string).unwrap_or_else(|| previous.clone());

        let mut value = typed;

        if is_image_key(key) {
            if let Some(upload) = form.file(&format!("{}_file", key)) {
                match generate_stored_filename(&upload.original_filename, None) {
                    Some(stored_filename) => {
                        if let Err(e) = state.storage.save(
                            target.project.id,
                            image_folder,
                            &stored_filename,
                            &upload.bytes,
                        ) {
                            error!(error = %e, "failed to store image upload");
                            warning = format!("Could not store the file for \"{}\"", key);
                            value = previous;
                        } else {
                            let asset = ProjectAssetCreate {
                                project_id: target.project.id,
                                kind: AssetKind::Image,
                                original_filename: upload.original_filename.clone(),
                                stored_filename: stored_filename.clone(),
                            };
                            if let Err(e) = db::create_asset(&state.pool, &asset).await {
                                error!(error = %e, "failed to record image asset");
                            }
                            value = stored_filename;
                        }
                    }
                    None => {
                        // Unsupported upload keeps whatever was there.
                        warn!(
                            filename = %upload.original_filename,
                            key = %key,
                            "rejected image upload with unsupported file type"
                        );
                        warning = format!(
                            "The file for \"{}\" is not an allowed image type and was ignored",
                            key
                        );
                        value = previous;
                    }
                }
            }
        }

        content.insert(key.clone(), value);
    }

    let page = match db::update_page_content(&state.pool, target.page.id, &content).await {
        Ok(Some(page)) => page,
        Ok(None) => return render_not_found(),
        Err(e) => {
            error!(error = %e, "failed to save page content");
            return render(ContentFormTemplate {
                project: target.project,
                page: target.page,
                fields: content_fields(&placeholders, &content),
                error: "Database error. Please try again.".to_string(),
                success: String::new(),
            });
        }
    };

    let success = if warning.is_empty() {
        "Content saved".to_string()
    } else {
        String::new()
    };

    render(ContentFormTemplate {
        project: target.project,
        fields: content_fields(&placeholders, &page.content),
        page,
        error: warning,
        success,
    })
}
