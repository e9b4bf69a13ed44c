//! QUESTFLOW Storage - Storage Traits and In-Memory Implementation
//!
//! Defines the storage abstraction for profiles, referral events and the
//! claim ledger. The Postgres implementation lives in questflow-api.

pub mod memory;
pub mod store;

pub use memory::InMemoryStore;
pub use store::{ProfileStore, QuestStore, ReferralStore};
