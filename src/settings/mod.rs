mod cli;
mod settings;

pub use clap::Parser;
pub use cli::*;
pub use settings::*;
