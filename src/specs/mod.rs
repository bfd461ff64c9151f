// src/specs/mod.rs

//! # Page extraction rules
//!
//! Page-specific knowledge: *where the ground truth lives in the HTML* and
//! *how to turn it into records*.
//!
//! ## What lives here
//! - Marker choice (`div` carrying `sec-times`) and the emphasis tag that
//!   wraps each terminal's value.
//! - Positional pairing of harvested values with the configured terminals.
//! - The all-or-nothing rule for a cycle's records.
//!
//! ## What does **not** live here
//! - Fetching (`core::net`), generic tree walking (`core::html`).
//! - Persistence (`store`, `file`) and cadence (`runner`).
//!
//! ## Typical call chain
//! ```text
//! runner::Runner::cycle → PageSource::fetch → specs::sec_times::extract_page
//!                                          ↘  Vec<TerminalSecurityRecord>
//!                       → Sink::persist (outside this module)
//! ```
//!
//! ## Testing notes
//! Rules are tested offline against small synthetic documents.
pub mod sec_times;
