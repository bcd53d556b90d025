//! Install a named subset of a project's development dependencies.
//!
//! `package.json` declares subsets under `subsets`, each with an `include`
//! or `exclude` list of dev dependency names. Installing a subset rewrites
//! the manifest to just those dependencies, runs yarn (or npm), and then
//! puts the original manifest and lockfiles back.

pub mod backup;
pub mod error;
pub mod install;
pub mod installer;
pub mod manifest;
pub mod runtime;
pub mod subset;
