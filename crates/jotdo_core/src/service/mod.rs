//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate parser, repository and reminder calls into use-case APIs.
//! - Keep UI/FFI layers decoupled from storage and platform details.

pub mod todo_service;
