#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # marketmap-entities
//!
//! Domain entities of the marketmap location dataset.
//!
//! The entities only contain generic functionality without any I/O.

pub mod address;
pub mod dataset;
pub mod geo;
pub mod record;
