//! # deskpilot-driver
//!
//! OS automation for deskpilot.  Each [`Driver`] is one tier (structured
//! input, script bridge, process spawn, raw key codes); a [`DriverChain`]
//! orders them and exposes the [`AutomationBackend`] interface the
//! workspace executor consumes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  AutomationBackend  (bool per call)       │
//! ├──────────────────────────────────────────┤
//! │  DriverChain::attempt(Invocation)         │
//! │    1. native    (enigo, feature-gated)    │
//! │    2. script    (osascript)               │
//! │    3. spawn     (open / python3 Quartz)   │
//! │    4. keycode   (keyboard only)           │
//! ├──────────────────────────────────────────┤
//! │  CommandRunner  (tokio::process)          │
//! └──────────────────────────────────────────┘
//! ```

pub mod capability;
pub mod chain;
pub mod config;
pub mod dry_run;
pub mod error;
pub mod keycode;
pub mod keys;
#[cfg(feature = "native-input")]
pub mod native;
pub mod runner;
pub mod script;
pub mod spawn;
pub mod traits;

// ── re-exports ───────────────────────────────────────────────────────

pub use capability::{Capability, Invocation, MouseButton, SystemOp};
pub use chain::DriverChain;
pub use config::{DriverConfig, SettleDelays};
pub use dry_run::DryRunBackend;
pub use error::{DriverError, Result};
pub use keycode::KeyCodeDriver;
pub use keys::{KeyChord, Modifier};
#[cfg(feature = "native-input")]
pub use native::NativeInputDriver;
pub use runner::{CommandRunner, SystemRunner};
pub use script::ScriptBridgeDriver;
pub use spawn::{SpawnDriver, SpawnPrograms};
pub use traits::{AutomationBackend, Driver, Pause};
