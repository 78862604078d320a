use actix_web::{get, post, web, HttpRequest, Responder};
use tracing::error;
use uuid::Uuid;

use siteforge::db;
use siteforge::models::{PageTemplateCreate, PageTemplateUpdate};

use crate::web::forms::{NoticeQuery, TemplateForm};
use crate::web::helpers::{
    is_unique_violation, render, render_not_found, require_user, see_other,
};
use crate::web::state::AppState;
use crate::web::templates::{TemplateFormTemplate, TemplatesListTemplate};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_templates)
        .service(new_template_form)
        .service(create_template)
        .service(edit_template_form)
        .service(update_template)
        .service(delete_template);
}

fn list_error_message(code: &str) -> String {
    match code {
        "in_use" => "That template is used by at least one page and cannot be deleted".to_string(),
        "db" => "Database error. Please try again.".to_string(),
        other => other.to_string(),
    }
}

#[get("/templates")]
pub async fn list_templates(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<NoticeQuery>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }

    let templates = match db::list_page_templates(&state.pool).await {
        Ok(templates) => templates,
        Err(e) => {
            error!(error = %e, "failed to list page templates");
            Vec::new()
        }
    };

    render(TemplatesListTemplate {
        templates,
        error: query.error.as_deref().map(list_error_message).unwrap_or_default(),
    })
}

#[get("/templates/new")]
pub async fn new_template_form(req: HttpRequest) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }

    render(TemplateFormTemplate {
        legend: "New page template".to_string(),
        action: "/templates/new".to_string(),
        name: String::new(),
        description: String::new(),
        html: String::new(),
        error: String::new(),
    })
}

#[post("/templates/new")]
pub async fn create_template(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<TemplateForm>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }

    let name = form.name.trim().to_string();
    let description = form.description.as_deref().unwrap_or_default().trim().to_string();

    let redisplay = |error: String| {
        render(TemplateFormTemplate {
            legend: "New page template".to_string(),
            action: "/templates/new".to_string(),
            name: name.clone(),
            description: description.clone(),
            html: form.html.clone(),
            error,
        })
    };

    if name.is_empty() || form.html.trim().is_empty() {
        return redisplay("Template name and HTML content are both required".to_string());
    }

    let data = PageTemplateCreate {
        name: name.clone(),
        description: description.clone(),
        html: form.html.clone(),
    };

    match db::create_page_template(&state.pool, &data).await {
        Ok(_) => see_other("/templates"),
        Err(e) if is_unique_violation(&e) => {
            redisplay(format!("A template named \"{}\" already exists", name))
        }
        Err(e) => {
            error!(error = %e, "failed to create page template");
            redisplay("Database error. Please try again.".to_string())
        }
    }
}

#[get("/templates/{id}/edit")]
pub async fn edit_template_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let id = path.into_inner();

    match db::get_page_template_by_id(&state.pool, id).await {
        Ok(Some(template)) => render(TemplateFormTemplate {
            legend: format!("Edit template \"{}\"", template.name),
            action: format!("/templates/{}/edit", template.id),
            name: template.name,
            description: template.description,
            html: template.html,
            error: String::new(),
        }),
        Ok(None) => render_not_found(),
        Err(e) => {
            error!(error = %e, "failed to load page template");
            see_other("/templates?error=db")
        }
    }
}

#[post("/templates/{id}/edit")]
pub async fn update_template(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    form: web::Form<TemplateForm>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let id = path.into_inner();

    let name = form.name.trim().to_string();
    let description = form.description.as_deref().unwrap_or_default().trim().to_string();

    let redisplay = |error: String| {
        render(TemplateFormTemplate {
            legend: "Edit template".to_string(),
            action: format!("/templates/{}/edit", id),
            name: name.clone(),
            description: description.clone(),
            html: form.html.clone(),
            error,
        })
    };

    if name.is_empty() || form.html.trim().is_empty() {
        return redisplay("Template name and HTML content are both required".to_string());
    }

    let data = PageTemplateUpdate {
        name: Some(name.clone()),
        description: Some(description.clone()),
        html: Some(form.html.clone()),
    };

    match db::update_page_template(&state.pool, id, &data).await {
        Ok(Some(_)) => see_other("/templates"),
        Ok(None) => render_not_found(),
        Err(e) if is_unique_violation(&e) => {
            redisplay(format!("A template named \"{}\" already exists", name))
        }
        Err(e) => {
            error!(error = %e, "failed to update page template");
            redisplay("Database error. Please try again.".to_string())
        }
    }
}

#[post("/templates/{id}/delete")]
pub async fn delete_template(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let id = path.into_inner();

    match db::page_template_in_use(&state.pool, id).await {
        Ok(true) => return see_other("/templates?error=in_use"),
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "failed to check template usage");
            return see_other("/templates?error=db");
        }
    }

    match db::delete_page_template(&state.pool, id).await {
        Ok(_) => see_other("/templates"),
        Err(e) => {
            error!(error = %e, "failed to delete page template");
            see_other("/templates?error=db")
        }
    }
}
