//! Agent module - role agents and the run coordinator
//!
//! A [`RoleAgent`] walks one role's pages; the [`SiteHealthMaster`] sequences
//! or parallelises role agents and merges their results.

pub mod master;
pub mod role_agent;

pub use master::{RunOptions, SiteHealthMaster};
pub use role_agent::{RoleAgent, RoleRunOptions};
