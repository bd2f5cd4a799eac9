//! Session memory implementations for Roamer.

pub mod in_memory;

pub use in_memory::InMemorySessionStore;
