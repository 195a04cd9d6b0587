//! # deskpilot-store
//!
//! Layout storage for deskpilot.
//!
//! Two tiers hold layouts: a user-global JSON object keyed by id
//! ([`LayoutFile`]) and a local project directory with one file per layout
//! ([`LayoutDir`]).  [`LayoutResolver`] searches both with a fixed
//! precedence and backs resolved layouts up into the local directory.
//!
//! ```ignore
//! use deskpilot_store::{LayoutDir, LayoutFile, LayoutResolver};
//!
//! let resolver = LayoutResolver::new(
//!     LayoutFile::new("/Users/me/.deskpilot/workspace-layouts.json"),
//!     LayoutDir::new("layouts"),
//! );
//! let found = resolver.resolve("meeting").await?;
//! println!("{} from {}", found.id, found.source);
//! ```

mod atomic;
pub mod defaults;
pub mod error;
pub mod json_store;
pub mod local_dir;
pub mod resolver;

// ── re-exports ───────────────────────────────────────────────────────

pub use defaults::default_layouts;
pub use error::{StoreError, StoreResult};
pub use json_store::LayoutFile;
pub use local_dir::{LayoutDir, sanitize_name};
pub use resolver::{LayoutResolver, LayoutSource, LayoutSummary, LayoutTier, ResolvedLayout};
