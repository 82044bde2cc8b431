//! Concrete update steps.
//!
//! Each module contains steps that implement `Step` for one family of
//! release files. Steps only describe where a version lives and what it
//! should look like; the version map reading and bounded rewrite live in
//! `crate::manifest`.

pub mod aspnetcore;

pub use aspnetcore::{StepKind, builder_image, runtime_image};
