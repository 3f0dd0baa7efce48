//! Single-use report links for fleet drivers.
//!
//! Drivers without accounts receive a link carrying a random token, submit
//! one daily route report through it, and may correct that report for a short
//! edit window afterwards.

pub mod app;
pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
