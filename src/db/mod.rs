//! Database module for the affiliate directory.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - Repository for tracking tags and commission plans

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
