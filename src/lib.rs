pub mod client;
pub mod components;
pub mod config;
pub mod controllers;
pub mod db_ops;
pub mod errors;
pub mod extractors;
pub mod htmx;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod views;
