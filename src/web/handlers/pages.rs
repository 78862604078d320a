use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use tracing::error;
use uuid::Uuid;

use siteforge::db;
use siteforge::models::{is_valid_slug, Project, ProjectPageCreate, ProjectPageUpdate};

use crate::web::forms::{NoticeQuery, PageForm};
use crate::web::helpers::{render, render_not_found, require_user, see_other};
use crate::web::state::AppState;
use crate::web::templates::{PageFormTemplate, PagesListTemplate};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_pages)
        .service(new_page_form)
        .service(create_page)
        .service(edit_page_form)
        .service(update_page)
        .service(delete_page);
}

fn list_error_message(code: &str) -> String {
    match code {
        "db" => "Database error. Please try again.".to_string(),
        other => other.to_string(),
    }
}

async fn load_project(
    state: &AppState,
    project_id: Uuid,
) -> Result<Project, HttpResponse> {
    match db::get_project_by_id(&state.pool, project_id).await {
        Ok(Some(project)) => Ok(project),
        Ok(None) => Err(render_not_found()),
        Err(e) => {
            error!(error = %e, "failed to load project");
            Err(see_other("/projects?error=db"))
        }
    }
}

#[get("/projects/{project_id}/pages")]
pub async fn list_pages(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    query: web::Query<NoticeQuery>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let project = match load_project(&state, path.into_inner()).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    let pages = match db::list_pages_for_project(&state.pool, project.id).await {
        Ok(pages) => pages,
        Err(e) => {
            error!(error = %e, project_id = %project.id, "failed to list pages");
            Vec::new()
        }
    };

    render(PagesListTemplate {
        project,
        pages,
        error: query.error.as_deref().map(list_error_message).unwrap_or_default(),
    })
}

#[get("/projects/{project_id}/pages/new")]
pub async fn new_page_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let project = match load_project(&state, path.into_inner()).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    let templates = db::list_page_templates(&state.pool).await.unwrap_or_default();

    render(PageFormTemplate {
        legend: format!("New page in \"{}\"", project.name),
        action: format!("/projects/{}/pages/new", project.id),
        project,
        title: String::new(),
        slug: String::new(),
        template_id: String::new(),
        templates,
        error: String::new(),
    })
}

/// Shared validation for the create and edit forms. Returns the parsed
/// template id, or the message to show the user.
async fn validate_page_form(
    state: &AppState,
    project_id: Uuid,
    form: &PageForm,
    exclude_page: Option<Uuid>,
) -> Result<Uuid, String> {
    if form.title.trim().is_empty() {
        return Err("Page title is required".to_string());
    }

    let slug = form.slug.trim();
    if !is_valid_slug(slug) {
        return Err(
            "Slug must be lowercase letters, digits and single hyphens (e.g. \"about-us\")"
                .to_string(),
        );
    }

    let template_id = Uuid::parse_str(form.template_id.trim())
        .map_err(|_| "Please select a template".to_string())?;

    match db::get_page_template_by_id(&state.pool, template_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err("The selected template no longer exists".to_string()),
        Err(e) => {
            error!(error = %e, "failed to look up template");
            return Err("Database error. Please try again.".to_string());
        }
    }

    match db::slug_taken(&state.pool, project_id, slug, exclude_page).await {
        Ok(false) => Ok(template_id),
        Ok(true) => Err(format!(
            "The slug \"{}\" is already used by another page in this project",
            slug
        )),
        Err(e) => {
            error!(error = %e, "failed to check slug uniqueness");
            Err("Database error. Please try again.".to_string())
        }
    }
}

#[post("/projects/{project_id}/pages/new")]
pub async fn create_page(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    form: web::Form<PageForm>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let project = match load_project(&state, path.into_inner()).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    let redisplay = |error: String, templates| {
        render(PageFormTemplate {
            legend: format!("New page in \"{}\"", project.name),
            action: format!("/projects/{}/pages/new", project.id),
            project: project.clone(),
            title: form.title.clone(),
            slug: form.slug.clone(),
            template_id: form.template_id.clone(),
            templates,
            error,
        })
    };

    let template_id = match validate_page_form(&state, project.id, &form, None).await {
        Ok(template_id) => template_id,
        Err(message) => {
            let templates = db::list_page_templates(&state.pool).await.unwrap_or_default();
            return redisplay(message, templates);
        }
    };

    let data = ProjectPageCreate {
        project_id: project.id,
        template_id,
        title: form.title.trim().to_string(),
        slug: form.slug.trim().to_string(),
    };

    match db::create_page(&state.pool, &data).await {
        Ok(_) => see_other(&format!("/projects/{}/pages", project.id)),
        Err(e) => {
            error!(error = %e, "failed to create page");
            let templates = db::list_page_templates(&state.pool).await.unwrap_or_default();
            redisplay("Database error. Please try again.".to_string(), templates)
        }
    }
}

#[get("/projects/{project_id}/pages/{page_id}/edit")]
pub async fn edit_page_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let (project_id, page_id) = path.into_inner();
    let project = match load_project(&state, project_id).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    let page = match db::get_page_in_project(&state.pool, project.id, page_id).await {
        Ok(Some(page)) => page,
        Ok(None) => return render_not_found(),
        Err(e) => {
            error!(error = %e, "failed to load page");
            return see_other(&format!("/projects/{}/pages?error=db", project.id));
        }
    };

    let templates = db::list_page_templates(&state.pool).await.unwrap_or_default();

    render(PageFormTemplate {
        legend: format!("Edit page \"{}\"", page.title),
        action: format!("/projects/{}/pages/{}/edit", project.id, page.id),
        project,
        title: page.title,
        slug: page.slug,
        template_id: page.template_id.to_string(),
        templates,
        error: String::new(),
    })
}

#[post("/projects/{project_id}/pages/{page_id}/edit")]
pub async fn update_page(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Form<PageForm>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let (project_id, page_id) = path.into_inner();
    let project = match load_project(&state, project_id).await {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    let page = match db::get_page_in_project(&state.pool, project.id, page_id).await {
        Ok(Some(page)) => page,
        Ok(None) => return render_not_found(),
        Err(e) => {
            error!(error = %e, "failed to load page");
            return see_other(&format!("/projects/{}/pages?error=db", project.id));
        }
    };

    let redisplay = |error: String, templates| {
        render(PageFormTemplate {
            legend: format!("Edit page \"{}\"", page.title),
            action: format!("/projects/{}/pages/{}/edit", project.id, page.id),
            project: project.clone(),
            title: form.title.clone(),
            slug: form.slug.clone(),
            template_id: form.template_id.clone(),
            templates,
            error,
        })
    };

    let template_id = match validate_page_form(&state, project.id, &form, Some(page.id)).await {
        Ok(template_id) => template_id,
        Err(message) => {
            let templates = db::list_page_templates(&state.pool).await.unwrap_or_default();
            return redisplay(message, templates);
        }
    };

    let data = ProjectPageUpdate {
        template_id: Some(template_id),
        title: Some(form.title.trim().to_string()),
        slug: Some(form.slug.trim().to_string()),
    };

    match db::update_page_settings(&state.pool, page.id, &data).await {
        Ok(Some(_)) => see_other(&format!("/projects/{}/pages", project.id)),
        Ok(None) => render_not_found(),
        Err(e) => {
            error!(error = %e, "failed to update page");
            let templates = db::list_page_templates(&state.pool).await.unwrap_or_default();
            redisplay("Database error. Please try again.".to_string(), templates)
        }
    }
}

#[post("/projects/{project_id}/pages/{page_id}/delete")]
pub async fn delete_page(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> impl Responder {
    if let Err(resp) = require_user(&req) {
        return resp;
    }
    let (project_id, page_id) = path.into_inner();

    match db::delete_page(&state.pool, project_id, page_id).await {
        Ok(true) => see_other(&format!("/projects/{}/pages", project_id)),
        Ok(false) => render_not_found(),
        Err(e) => {
            error!(error = %e, "failed to delete page");
            see_other(&format!("/projects/{}/pages?error=db", project_id))
        }
    }
}
