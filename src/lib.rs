pub mod common;
pub mod db;
pub mod models;
pub mod render;
pub mod services;
