//! Core logic for the web radar: map name resolution, the session state
//! snapshot, and user settings.
//!
//! Everything here is independent of the transport. The resolver is a pure
//! function over a fixed catalog; [`SessionState`] is the immutable snapshot
//! the session publishes after each decoded frame; [`SettingsStore`] is a
//! thin persistence wrapper around the render settings.

pub mod resolver;
pub mod settings;
pub mod state;

pub use resolver::{MapCatalog, ResolvedMap};
pub use settings::{Settings, SettingsStore};
pub use state::{MapData, SessionState};
