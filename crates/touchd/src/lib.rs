//! Touchd - Touch pHAT front end for the rpi-kvm host switching service
//!
//! This crate provides the daemon's building blocks:
//! - `service` - D-Bus client seam for `org.rpi.kvmservice`
//! - `session` - session manager: connect, load settings, invoke, reconnect
//! - `panel` - button panel capability and the CAP1166 driver
//! - `dispatcher` - button releases in, remote calls out
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     touchd daemon                       │
//! │                                                         │
//! │  ┌──────────────┐  events   ┌───────────────────────┐   │
//! │  │ Cap1166Panel │──────────▶│   ButtonDispatcher    │   │
//! │  │ (I2C poll)   │  channel  │ (one task per event)  │   │
//! │  └──────────────┘           └──────────┬────────────┘   │
//! │                                        │ invoke         │
//! │                             ┌──────────▼────────────┐   │
//! │                             │    SessionManager     │   │
//! │                             │ (session + ActionMap) │   │
//! │                             └──────────┬────────────┘   │
//! └────────────────────────────────────────┼────────────────┘
//!                                          │ system D-Bus
//!                               ┌──────────▼────────────┐
//!                               │  org.rpi.kvmservice   │
//!                               └───────────────────────┘
//! ```
//!
//! All transport failures are recovered locally by the session manager;
//! nothing propagates past this crate under normal operation.

pub mod dispatcher;
pub mod error;
pub mod panel;
pub mod service;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
