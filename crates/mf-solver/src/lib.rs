//! mf-solver: nonlinear solvers and the problem that drives a model.
//!
//! A [`Group`] pairs a [`mf_system::System`] with a [`NonlinearSolver`];
//! [`RunOnce`] is the single-pass solver that walks the children in order,
//! transferring data into each before evaluating it. A [`Problem`] owns the
//! root vectors, and a [`Subproblem`] wraps a whole problem as a component of
//! another model.
//!
//! ```
//! use mf_solver::{Group, Problem};
//! use mf_system::{LinearComponent, SystemBuilder};
//!
//! let mut builder = SystemBuilder::new();
//! builder.add_subsystem(
//!     "a",
//!     LinearComponent::new(vec!["x".into()], "y", vec![2.0], 0.0).unwrap(),
//! );
//! builder.add_subsystem(
//!     "b",
//!     LinearComponent::new(vec!["x".into()], "y", vec![1.0], 1.0).unwrap(),
//! );
//! builder.connect("a.y", "b.x");
//!
//! let mut problem = Problem::new(Group::new(builder.build().unwrap())).unwrap();
//! problem.set_val("a.x", 3.0).unwrap();
//! problem.run_model().unwrap();
//! assert_eq!(problem.get_val("b.y").unwrap(), 7.0);
//! ```

pub mod error;
pub mod group;
pub mod problem;
pub mod run_once;
pub mod solver;
pub mod subproblem;

pub use error::{SolverError, SolverResult};
pub use group::Group;
pub use problem::Problem;
pub use run_once::RunOnce;
pub use solver::{NonlinearSolver, SolveOutcome, SolveProgressEvent};
pub use subproblem::{IoSpec, ResolvedVar, Subproblem, resolve_model_io};
