pub mod auth;
pub mod config;
pub mod errors;
pub mod feedback;
pub mod lever_client;
pub mod models;
pub mod render;
pub mod routes;
pub mod state;
pub mod user_cache;

#[cfg(test)]
mod testing;
