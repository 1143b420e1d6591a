pub mod aggregate;
pub mod config;
pub mod entities;
pub mod errors;
pub mod filter;
pub mod github;
pub mod logging;
pub mod page;
pub mod parser;
pub mod refresh;
pub mod render;
pub mod server;
pub mod store;
pub mod ui;
