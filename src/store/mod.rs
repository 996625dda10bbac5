//! Persistent key-value store for CI artifacts and debug symbols
//!
//! Everything lives under a single environment root:
//!
//! ```text
//! <root>/artifacts/<project>/<job>/artifacts/...   raw job artifacts
//! <root>/artifacts/<project>/<job>/version.txt     derived product version
//! <root>/artifacts/<project>/<job>/pipeline.txt
//! <root>/artifacts/<project>/<job>/project.txt
//! <root>/symbols/<version>/symbols/...             extracted symbol files
//! ```
//!
//! `<project>` is the configured GitLab project path with `%` and `/`
//! escaped, so the default `DataDog/datadog-agent` is stored as
//! `artifacts/DataDog%2Fdatadog-agent/<job>`. Keys containing `.` or `..`
//! segments are rejected.
//!
//! Directory trees are copied into a `.staging-*` sibling and renamed into
//! place, so an interrupted copy reads as absent rather than as a partial
//! tree.
//!
//! # Entry Lifecycle
//!
//! | Entry | Created | Mutated | Removed |
//! |-------|---------|---------|---------|
//! | Blob / subtree | first `add` | overwritten by `add` | never |
//! | Job artifacts | first download | text setters | never |
//! | Symbol set | first extraction | never | never |

pub mod artifacts;
pub mod path;
pub mod symbols;

pub use artifacts::{ArtifactStore, Artifacts, TextField};
pub use path::PathStore;
pub use symbols::SymbolStore;
