//! # gifpar-io
//!
//! Everything that touches the filesystem:
//!
//! - [`gif`] - animated GIF decode/encode on top of the `image` crate
//! - [`synthetic`] - seeded random frames for benchmark runs
//! - [`runlog`] - CSV run records appended to a results directory
//!
//! # Example
//!
//! ```rust,no_run
//! let seq = gifpar_io::load("input.gif")?;
//! gifpar_io::save("output.gif", &seq)?;
//! # Ok::<(), gifpar_io::IoError>(())
//! ```

#![warn(missing_docs)]

mod error;
pub mod gif;
pub mod runlog;
pub mod synthetic;

pub use error::{IoError, IoResult};
pub use gif::{load, save};
pub use runlog::RunRecord;
