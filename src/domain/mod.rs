//! Core domain models
//!
//! This module contains the fundamental types shared by every parser:
//! - Ecosystem tags
//! - Dependency scopes
//! - The normalized dependency record and its metadata annex

mod dependency;
mod ecosystem;

pub use dependency::{Dependency, Metadata, Scope};
pub use ecosystem::Ecosystem;
