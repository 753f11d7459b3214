//! Tenex Core Library
//!
//! Core domain logic for tenex-tools: Nostr events and keys, a blocking relay
//! client, the snippet envelope format, tag ranking, and the local SQLite
//! cache of snippets, profiles and follow edges.

pub mod agent;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod event;
pub mod format;
pub mod instruction;
pub mod keys;
pub mod logging;
pub mod note;
pub mod profile;
pub mod rank;
pub mod relay;
pub mod snippet;
pub mod users;
pub mod wot;
