//! heicbatch: batch-convert HEIC/HEIF images to PNG, JPEG or WEBP on a bounded worker pool.
//!
//! Every regular file in the input directory becomes one task: HEIC/HEIF files are decoded and
//! re-encoded, everything else is copied through unchanged. A failing file never stops the rest.
//!
//! ```ignore
//! let config = heicbatch::BatchConfig::new("photos", "converted")
//!     .with_format(heicbatch::OutputFormat::Jpeg)
//!     .with_quality(85);
//! let result = heicbatch::run_batch(config, |p| println!("{}/{}", p.completed, p.total))?;
//! println!("{} succeeded, {} failed", result.succeeded, result.failed);
//! ```

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use engine::codec::SourceDecoder;
pub use error::{BatchError, ConfigError, SetupError, TaskError};
pub use pipeline::{BatchRunner, run_batch};
pub use utils::BatchLog;

/// Result alias for the CLI glue and helpers that use `anyhow`
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
