//! Invocation pipeline module.

mod handler;
mod stats;

pub use handler::Handler;
pub use stats::InvocationStats;
