use askama::Template;

use siteforge::models::{PageTemplate, Project, ProjectPage};

/// One input row on the content-editing form, derived from the
/// template's current placeholders.
pub struct ContentField {
    pub key: String,
    pub file_input_name: String,
    pub value: String,
    pub is_image: bool,
}

/// One row on the navbar-management form: every project page, whether
/// currently included or not.
pub struct NavbarRow {
    pub page_id: String,
    pub title: String,
    pub in_navbar: bool,
    pub link_text: String,
    pub position: i32,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: String,
    pub next: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub error: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub template_count: i64,
    pub project_count: i64,
    pub templates_sample: Vec<PageTemplate>,
    pub projects_sample: Vec<Project>,
}

#[derive(Template)]
#[template(path = "templates_list.html")]
pub struct TemplatesListTemplate {
    pub templates: Vec<PageTemplate>,
    pub error: String,
}

#[derive(Template)]
#[template(path = "template_form.html")]
pub struct TemplateFormTemplate {
    pub legend: String,
    pub action: String,
    pub name: String,
    pub description: String,
    pub html: String,
    pub error: String,
}

#[derive(Template)]
#[template(path = "projects_list.html")]
pub struct ProjectsListTemplate {
    pub projects: Vec<Project>,
    pub error: String,
}

#[derive(Template)]
#[template(path = "project_form.html")]
pub struct ProjectFormTemplate {
    pub legend: String,
    pub action: String,
    pub name: String,
    pub site_title: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub global_css: String,
    pub favicon_filename: String,
    pub error: String,
}

#[derive(Template)]
#[template(path = "pages_list.html")]
pub struct PagesListTemplate {
    pub project: Project,
    pub pages: Vec<ProjectPage>,
    pub error: String,
}

#[derive(Template)]
#[template(path = "page_form.html")]
pub struct PageFormTemplate {
    pub legend: String,
    pub action: String,
    pub project: Project,
    pub title: String,
    pub slug: String,
    pub template_id: String,
    pub templates: Vec<PageTemplate>,
    pub error: String,
}

#[derive(Template)]
#[template(path = "content_form.html")]
pub struct ContentFormTemplate {
    pub project: Project,
    pub page: ProjectPage,
    pub fields: Vec<ContentField>,
    pub error: String,
    pub success: String,
}

#[derive(Template)]
#[template(path = "navbar_form.html")]
pub struct NavbarFormTemplate {
    pub project: Project,
    pub rows: Vec<NavbarRow>,
    pub error: String,
    pub success: String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {}
