//! mf-core: shared foundation for mdflow.
//!
//! Contains:
//! - numeric (Real + finiteness check)
//! - error (shared error types)

pub mod error;
pub mod numeric;

pub use error::{MfError, MfResult};
pub use numeric::*;
