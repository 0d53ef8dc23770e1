//! treino - Personal weekly workout planner and logbook
//!
//! Plan, session log and video catalog are plain JSON documents kept in
//! memory by a [`Planner`] and rewritten whole on every change.

pub mod app;
pub mod config;
pub mod error;
pub mod plan;
pub mod sessions;
pub mod store;
pub mod tui;
pub mod videos;
pub mod web;

pub use app::Planner;
pub use config::Config;
pub use error::{Error, Result};
