//! # CLI Module
//!
//! Command-line front end used by the `brrtdispatch` binary. It builds a small
//! demo service from the runtime configuration and lets you inspect or
//! exercise it without a network listener.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Print the registered routing table:
//!
//! ```bash
//! brrtdispatch routes
//! ```
//!
//! ### `dispatch`
//!
//! Run a single request through the full middleware pipeline:
//!
//! ```bash
//! brrtdispatch dispatch GET /pets/42
//! brrtdispatch --config config.yaml dispatch POST /pets --body Fluffy
//! ```
//!
//! Route registration errors abort the command before anything is dispatched.

mod commands;

pub use commands::{build_dispatcher, register_demo_routes, run_cli, Cli, Commands};
