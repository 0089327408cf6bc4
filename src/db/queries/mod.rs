//! Database query modules

pub mod client;
