//! CLD Domain Layer
//!
//! Core domain model for causal-loop-diagram extraction. This crate defines
//! the fundamental value types and the trait boundaries that all other layers
//! depend upon.
//!
//! ## Key Concepts
//!
//! - **Relationship**: a directed causal edge between two variables with a
//!   polarity
//! - **Polarity**: whether the subject and object move in the same direction
//!   (`positive`) or opposite directions (`negative`)
//! - **Variable**: a normalized entity name appearing as subject or object of
//!   at least one relationship; identity is the normalized string itself
//!
//! ## Architecture
//!
//! Infrastructure implementations (LLM and embedding providers) live in other
//! crates; this crate only holds value types, normalization rules, and the
//! `Reasoner`/`Embedder` trait definitions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod relationship;
pub mod traits;
pub mod variable;

pub use relationship::{extract_variables, Polarity, RawPredicate, Relationship};
pub use traits::{CompletionOptions, Embedder, Message, Reasoner, Role};
pub use variable::{humanize, normalize_name};
