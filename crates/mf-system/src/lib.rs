//! mf-system: the model tree for mdflow.
//!
//! Provides:
//! - Named variable vectors and declarations
//! - The `Subsystem` contract and simple leaf components
//! - Directional transfers and the validated per-child transfer table
//! - Local ownership policies
//! - `System` + `SystemBuilder` with connection validation
//!
//! # Example
//!
//! ```
//! use mf_system::{LinearComponent, SystemBuilder};
//!
//! let mut builder = SystemBuilder::new();
//! builder.add_subsystem(
//!     "double",
//!     LinearComponent::new(vec!["x".into()], "y", vec![2.0], 0.0).unwrap(),
//! );
//! builder.add_subsystem(
//!     "shift",
//!     LinearComponent::new(vec!["x".into()], "y", vec![1.0], 3.0).unwrap(),
//! );
//! builder.connect("double.y", "shift.x");
//! let system = builder.build().unwrap();
//!
//! assert_eq!(system.len(), 2);
//! assert_eq!(system.input_len(), 2);
//! ```

pub mod builder;
pub mod component;
pub mod error;
pub mod ownership;
pub mod subsystem;
pub mod system;
pub mod transfer;
pub(crate) mod validate;
pub mod vector;

pub use builder::SystemBuilder;
pub use component::{FnComponent, LinearComponent};
pub use error::{SystemError, SystemResult};
pub use ownership::Ownership;
pub use subsystem::{Subsystem, join_path};
pub use system::{Child, System};
pub use transfer::{Direction, SlotTransfer, Transfer, TransferTable};
pub use vector::{VarDecl, VarVector};
