//! Core types and pure derivations for the Liftoff launch browser.
//!
//! This crate is deliberately free of HTTP and storage dependencies. It owns
//! the wire shapes of the SpaceX API, the normalised mission model, and the
//! functions that turn one into the other.

pub mod error;
pub mod groups;
pub mod launch;
pub mod metadata;
pub mod mission;
pub mod stats;
pub mod video;

pub use error::{Error, Result};
