//! Sea-route CLI library.
//!
//! Rendering helpers shared by the `searoute` binary: output formats for
//! routes, snaps, and mask summaries plus terminal styling.

pub mod output;
pub mod terminal;
