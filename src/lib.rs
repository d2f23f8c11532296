//! # Introduction
//!
//! cregistry scans a C/C++ source tree for struct and union definitions,
//! builds a tree model of their members (nested frames, bitfields, plain
//! and array variables), and regenerates the registration code for every
//! struct flagged with the `REGISTER_STRUCT` marker macro, so a firmware
//! debug console can read and write arbitrary struct fields by dotted
//! name without hand-written bindings.
//!
//! ## Pipeline
//!
//! ```text
//! Sources → Normalizer → Frame extractor → Frame model ┐
//!         → Registration scanner ────────────────────── ┴→ Code generator → output file
//! ```
//!
//! 1. [`scan::normalize`] strips comments, preprocessor lines, and
//!    initializers, and canonicalizes whitespace.
//! 2. [`scan::extract`] locates definitions by brace matching, skipping
//!    anything outside the supported subset.
//! 3. [`model`] builds the [`model::Frame`] tree: members in declaration
//!    order with qualified type and field paths.
//! 4. [`scan::registry`] collects `REGISTER_STRUCT` requests from the
//!    raw file text.
//! 5. [`codegen`] joins requests against the model and rewrites the
//!    generated region of the output file.
//!
//! ## Supported C subset
//!
//! Struct/union definitions with nested (possibly anonymous) frames,
//! bitfields, fixed-size arrays, and primitive members. Preprocessor
//! conditionals, templates, function pointers, and macro-expanded
//! declarations are skipped, never parsed.

pub mod codegen;
pub mod errors;
pub mod model;
pub mod scan;
pub mod types;
pub mod workspace;
