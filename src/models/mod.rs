pub use navbar_item::*;
pub use page_template::*;
pub use project::*;
pub use project_asset::*;
pub use project_page::*;
pub use user::*;

mod navbar_item;
mod page_template;
mod project;
mod project_asset;
mod project_page;
mod user;
