//! Keeps the Markdown source and the rendered HTML of content items in
//! lockstep across editor writes, revision restores and remote publishing
//! sessions.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
