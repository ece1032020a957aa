//! Debrid service abstraction.
//!
//! A debrid service takes a magnet reference and downloads the content on
//! its own servers. Only submission is modelled here; what happens to a
//! torrent after it has been accepted is up to the service.

mod real_debrid;
mod types;

pub use real_debrid::RealDebridClient;
pub use types::*;
