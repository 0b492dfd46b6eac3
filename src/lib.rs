pub mod app;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod fetch;
pub mod filter;
pub mod output;
pub mod pagination;
pub mod record;
pub mod state;
pub mod view;

#[cfg(test)]
mod tests;
