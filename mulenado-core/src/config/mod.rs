//! Configuration types
//!
//! Board-agnostic configuration structures. The firmware build embeds them
//! as postcard binary data.

pub mod types;

pub use types::*;
