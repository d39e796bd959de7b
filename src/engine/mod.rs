//! Engine: codec adapter, per-task work and the command-line front end

pub mod arg_parser;
pub mod cli;
pub mod codec;
pub mod convert;
#[cfg(feature = "heif")]
pub mod heif;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use codec::{SourceDecoder, UnavailableDecoder, default_decoder, encode, png_compression_level};
pub use convert::{convert_file, copy_file, run_task};
pub use tools::{converted_output_path, passthrough_output_path};
