pub mod channel;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod editor;
pub mod error;
pub mod history;
pub mod launcher;
pub mod listing;
pub mod logging;
pub mod output;
pub mod session;
pub mod steal;
