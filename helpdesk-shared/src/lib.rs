#![cfg_attr(not(test), forbid(unsafe_code))]
#![deny(warnings, clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)]

//! Wire models and configuration shared by the Helpdesk client and CLI.

pub mod config;
pub mod models;
