//! Health entity extraction service and dashboard.

pub mod api;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod logging;
pub mod nlp;
#[cfg(feature = "dashboard")]
pub mod ui;
