//! Append a day's commits, with their latest build status, to a Google Sheet.
//!
//! The flow lives in [`coordinator`]: load [`config::RunConfig`], compute the
//! [`window::DayWindow`], build rows through a [`gateway::SourceControl`] and
//! append them with a single [`gateway::Spreadsheet`] call.

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod ext;
pub mod gateway;
pub mod layout;
pub mod model;
pub mod report;
pub mod util;
pub mod window;
