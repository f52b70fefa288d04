//! Ambient plumbing shared by every other crate in the workspace: the error
//! taxonomy from , small id/listener types, and logging setup.
//!
//! Nothing here is part of the scene-graph engine's feature surface; it is
//! scaffolding every higher-level crate builds on.

mod error;
mod id;
mod logging;
mod notifier;

pub use error::{Error, ErrorCategory, Result};
pub use id::{next_listener_id, ListenerId};
pub use logging::init_tracing;
pub use notifier::{ChangeNotifier, ListenerCallback, Listenable};
