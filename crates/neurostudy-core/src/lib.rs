//! neurostudy-core
//!
//! Pure domain types and the relay's wire framing.
//! No network or provider dependency; shared by every crate in the
//! NeuroStudy relay.

pub mod error;
pub mod models;
pub mod stream;
