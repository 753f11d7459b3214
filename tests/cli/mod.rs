pub mod support;

mod mcp;
mod setup;
mod snippet;
mod users;
mod wot;
