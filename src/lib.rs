pub mod agent;
pub mod config;
pub mod notifier;
pub mod page_fetch;
pub mod routes;
pub mod state;
