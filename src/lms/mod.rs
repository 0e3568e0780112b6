//! LMS API surface: request paths and decoded entities

pub mod endpoints;
mod types;

pub use types::{AssignmentEntry, Course, FrontPage, ModuleEntry, Teacher};
