#![allow(clippy::let_unit_value)]
#![cfg_attr(feature = "ui", recursion_limit = "1024")]

#[cfg(feature = "ui")]
pub mod api;
pub mod config;
pub mod dto;
pub mod error;
#[cfg(feature = "ui")]
pub mod host;
#[cfg(feature = "ui")]
pub mod ui;
