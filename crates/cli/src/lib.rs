//! # Tattletail
//!
//! Invocation handler shared by the `tattletail` binary and the
//! end-to-end tests.
//!
//! One invocation:
//! - loads the rules file (object store or local bundle)
//! - builds the destination registry and rule set
//! - fetches every log object named by the event
//! - dispatches each record to the destinations of every matching rule

pub mod pipeline;

pub use pipeline::{Handler, InvocationStats};
