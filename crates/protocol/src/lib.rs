//! Wire types for the web radar telemetry protocol.
//!
//! This crate contains the serde-serializable types used for the telemetry
//! stream delivered by the game-instrumentation process over the socket.
//! These types represent the "protocol layer" - the shapes of data as they
//! appear on the wire, one JSON object per socket frame.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization/deserialization and
//!   small derived accessors
//! - **1:1 with the wire**: Field names match the instrumentation's `m_*`
//!   JSON keys
//! - **Forward-compatible**: Unknown keys are preserved, never dropped
//!
//! Session logic and derived state live in `radar-core` and `radar-runtime`.

pub mod frame;

pub use frame::*;
