//! Configuration module for lms-audit
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and resolving the API credential.
//!
//! # Example
//!
//! ```no_run
//! use lms_audit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("audit.toml")).unwrap();
//! println!("Auditing term prefix: {}", config.audit.term_prefix);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiConfig, AuditConfig, Config, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, resolve_token};
pub use validation::validate;
