//! Infrastructure layer (adapters/implementations).
//!
//! This module contains diff formats and IO-heavy integrations (SQLite, git, terminals).

pub mod app_config;
pub mod db;
pub mod diff;
pub mod hash;
pub mod terminal;
pub mod vcs;
