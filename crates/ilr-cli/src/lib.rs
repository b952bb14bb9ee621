//! Command-line front end for the ILR rule engine.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
