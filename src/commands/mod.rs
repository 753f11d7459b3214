//! CLI commands for tenex-tools

pub mod agents;
pub mod dispatch;
pub mod instructions;
pub mod output;
pub mod publish;
pub mod setup;
pub mod snippets;
pub mod users;
pub mod wot;
