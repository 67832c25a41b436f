//! Test fixtures and proptest strategies for Rewind development.
//!
//! - [`fixtures`]: deterministic scripted frame sequences and maps.
//! - [`strategies`]: proptest strategies for frames and frame pairs.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod strategies;

pub use fixtures::{checkerboard_layers, skirmish};
