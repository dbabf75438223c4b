//! lockgraph - Lockfile dependency normalizer library
//!
//! This library reads manifests and lockfiles from several ecosystems and
//! normalizes them into one dependency model:
//! - npm (package-lock.json v1 to v3)
//! - Yarn classic and Berry (yarn.lock)
//! - pnpm (pnpm-lock.yaml v5 to v9)
//! - Bundler (Gemfile, Gemfile.lock)
//! - Maven (`mvn dependency:list` output)
//!
//! Version strings can be parsed, canonicalized and compared under the PyPI,
//! npm, Maven and Cargo grammars.

pub mod cli;
pub mod domain;
pub mod error;
pub mod lockfile;
pub mod manifest;
pub mod output;
pub mod scanner;
pub mod version;
