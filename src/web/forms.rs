use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct TemplateForm {
    pub name: String,
    pub description: Option<String>,
    pub html: String,
}

#[derive(Deserialize)]
pub struct PageForm {
    pub title: String,
    pub slug: String,
    pub template_id: String,
}

#[derive(Deserialize)]
pub struct NoticeQuery {
    pub error: Option<String>,
}
