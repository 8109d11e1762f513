//! Terminal explorer for the git stash.
//!
//! The [`app::App`] state machine is driven by key actions from [`input`] and
//! by [`tasks::Completion`]s produced when backend work finishes. Backend work
//! goes through the [`git::StashBackend`] trait so the state machine never
//! waits on git itself.

pub mod app;
pub mod config;
pub mod git;
pub mod input;
pub mod logging;
pub mod models;
pub mod tasks;
pub mod theme;
pub mod ui;
pub mod utils;
