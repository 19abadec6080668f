//! External artwork lookup.
//!
//! Queries the iTunes Search API by artist + title text and downloads a
//! high-resolution artwork variant when a match exists. This is an
//! optional enrichment step: every failure mode collapses to "no
//! artwork found" at the public boundary.

mod client;
mod dto;

pub use client::{ArtworkClient, LookupError};
