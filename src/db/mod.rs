pub use db::*;
pub use navbar_items::*;
pub use page_templates::*;
pub use project_assets::*;
pub use project_pages::*;
pub use projects::*;
pub use users::*;

mod db;
mod navbar_items;
mod page_templates;
mod project_assets;
mod project_pages;
mod projects;
mod users;
