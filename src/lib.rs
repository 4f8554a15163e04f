// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod arena;
pub mod chain;
pub mod config;
pub mod leaderboard;
pub mod logging;
pub mod opponent;
pub mod player;
pub mod prompts;
pub mod room;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod worker;
