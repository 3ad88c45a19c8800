//! Radar runtime - telemetry socket lifecycle and session driving.
//!
//! This crate owns everything between the wire and the derived state:
//!
//! - **Transport**: WebSocket connection to the game-instrumentation
//!   process, read loop feeding an ordered event channel
//! - **Session state machine**: pure transition functions over the
//!   connection lifecycle (`Idle -> Connecting -> Connected -> ...`)
//! - **Connection driver**: applies the machine's effects, decodes
//!   frames, resolves maps, and publishes [`radar_core::SessionState`]
//!   snapshots
//! - **Asset loading**: map metadata fetched per resolved map id
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  radar-cli   │  config + snapshot consumer
//! └──────┬───────┘
//! ┌──────▼───────┐
//! │radar-runtime │  this crate
//! │ ┌──────────┐ │
//! │ │ Session  │ │  pure FSM + async driver
//! │ └──────────┘ │
//! │ ┌──────────┐ │
//! │ │Transport │ │  WebSocket read loop
//! │ └──────────┘ │
//! │ ┌──────────┐ │
//! │ │ Assets   │ │  HTTP map metadata
//! │ └──────────┘ │
//! └──────┬───────┘
//! ┌──────▼───────┐
//! │  radar-core  │  resolver, state, settings
//! └──────────────┘
//! ```
//!
//! Failures are handled locally: nothing is thrown across the session
//! boundary. Decode and asset failures degrade gracefully; only
//! configuration and transport errors surface to the caller.

pub mod assets;
pub mod config;
pub mod connection;
pub mod error;
pub mod latency;
pub mod session;
pub mod transport;

pub use assets::{AssetLoader, HttpAssetLoader};
pub use config::SessionConfig;
pub use connection::ConnectionSession;
pub use error::{Error, Result};
pub use latency::{LatencyTracker, RollingLatency};
pub use session::{Effect, SessionEvent, SessionPhase, transition};
pub use transport::{TransportEvent, WebSocketTransport};
