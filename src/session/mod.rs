/*!
 * Session state and the keyed session store.
 *
 * Exactly one session exists per editing conversation, looked up by an
 * opaque identifier. A session owns one video reference, one transcript,
 * one style config and four overlay lists; it is mutated only by applying
 * the result of one resolved action at a time. The store serializes writes
 * per session key, and persistence is a pluggable backend behind the
 * `SessionStore` trait - the engine never touches storage directly.
 */

pub mod models;
pub mod store;

// Re-export main types
pub use models::{Session, StyleConfig, StylePatch};
pub use store::{InMemorySessionStore, SessionLanes, SessionStore, SqliteSessionStore};
