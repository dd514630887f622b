//! CLI commands

pub mod generate;

pub use generate::{GenerateArgs, GenerateOutcome, handle_generate};
