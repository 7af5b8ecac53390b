#![cfg_attr(not(test), forbid(unsafe_code))]
#![deny(warnings, clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)]

//! Client for a session-cookie helpdesk backend.
//!
//! Layers, leaf to root: [`http::ApiClient`] (credentialed transport),
//! [`csrf::CsrfManager`] (double-submit CSRF), [`services`] (one wrapper per
//! REST resource), [`stores`] (state per domain area) and [`guard`] (route
//! access control). [`Helpdesk`] wires them together.

pub mod app;
pub mod csrf;
pub mod error;
pub mod guard;
pub mod http;
pub mod routes;
pub mod services;
pub mod stores;


pub use app::Helpdesk;
pub use error::{ClientError, ClientResult, ErrorKind};
pub use guard::{GuardDecision, Navigation, Navigator};
pub use routes::Route;
