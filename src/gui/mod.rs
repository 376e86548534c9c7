//! The egui application shell.

mod app;
mod theme;

pub use app::{AppSettings, TreeScopeApp};
