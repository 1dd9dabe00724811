//! Diagram renderers for causal loop diagrams
//!
//! Turns the pipeline's relationship lines (`"subject -->(+|-) object"`)
//! into two textual diagram formats:
//!
//! - **XMILE**: an XML interchange model where each variable becomes an
//!   `<aux>` and each edge a polarity-tagged `<connector>`
//! - **DOT**: a Graphviz digraph with the polarity symbol as edge label
//!
//! Both renderers skip lines with a missing variable or a self-edge.

#![warn(missing_docs)]

mod dot;
mod xmile;

pub use dot::render_dot;
pub use xmile::{render_xmile, xmile_name};
