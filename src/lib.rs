pub mod activity;
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod connections;
pub mod database;
pub mod entity;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod scope;
pub mod services;

#[cfg(test)]
pub mod testing;
