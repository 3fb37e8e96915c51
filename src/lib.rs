//! A single ledger node: proof-of-work mining, chain validation and
//! longest valid chain consensus, served over HTTP.

pub mod api;
pub mod blockchain;
pub mod config;
