// Library root: re-exports all modules so integration tests and the
// `dynasty-rank` binary can reach the crate's public API.

pub mod config;
pub mod db;
pub mod engine;
pub mod league;
pub mod valuation;
