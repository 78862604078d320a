pub mod assets;
pub mod auth;
pub mod content;
pub mod dashboard;
pub mod export;
pub mod navbar;
pub mod page_templates;
pub mod pages;
pub mod preview;
pub mod projects;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    auth::configure(cfg);
    dashboard::configure(cfg);
    page_templates::configure(cfg);
    projects::configure(cfg);
    pages::configure(cfg);
    content::configure(cfg);
    navbar::configure(cfg);
    preview::configure(cfg);
    export::configure(cfg);
    assets::configure(cfg);
}
