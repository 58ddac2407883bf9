pub mod api_connection;
pub mod cli;
pub mod config;
pub mod favorites;
pub mod i18n;
pub mod image_resolver;
pub mod preferences;
pub mod recipe;
pub mod recipe_generator;
pub mod render;
pub mod session;
pub mod store;
pub mod view_state;
