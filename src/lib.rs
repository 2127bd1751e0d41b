// src/lib.rs

pub mod analytics;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod routes;
