//! **ddc-switcher**: switch monitor video inputs over DDC/CI.
//!
//! Attached displays are enumerated with `ddcutil detect`, matched to stored
//! per-monitor preferences (position, usable inputs, last input) by a stable
//! identity key, and switched with `ddcutil setvcp 60 <code>`.
//!
//! # Architecture
//!
//! The crate is organised around two seams:
//!
//! * [`traits::CommandRunner`]: runs or launches external commands so the
//!   reconciliation logic is not coupled to real processes.
//! * [`traits::SettingsStore`]: a string-keyed settings backend so
//!   persistence is not coupled to any particular file or service.
//!
//! [`switcher::DisplaySwitcher`] drives both.  Production implementations
//! live in [`runner`] (`tokio::process`) and [`store`] (a JSON settings
//! document); `main.rs` is a command-line front end on top.

pub mod config;
pub mod ddcutil;
pub mod identity;
pub mod monitor;
pub mod runner;
pub mod state;
pub mod store;
pub mod switcher;
pub mod tracker;
pub mod traits;
