//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! All business crates depend on this crate, reverse dependencies are prohibited.
//!
//! ## Data Model
//! - [`Value`] is the JSON-shaped tagged union every record and query result uses
//! - [`Config`] is the parsed (not yet validated) rule/destination configuration
//! - [`Alert`] is what a matched record looks like to a destination

mod collaborator;
mod config;
mod destination;
mod error;
mod sink;
mod value;

pub use collaborator::*;
pub use config::*;
pub use destination::*;
pub use error::*;
pub use sink::*;
pub use value::*;
