pub mod album;
pub mod collaborators;
pub mod config;
pub mod database;
pub mod draft;
pub mod engine;
pub mod flow;
pub mod handlers;
pub mod messages;
pub mod navigation;
pub mod prompts;
pub mod report;
pub mod session;
pub mod state;
pub mod types;
