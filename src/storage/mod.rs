//! Durable key-value storage for session state.

pub mod kv;

pub use kv::KeyValueStore;

/// Storage keys as constants.
pub mod keys {
    /// Bearer token of the current session.
    pub const TOKEN: &str = "token";
}
