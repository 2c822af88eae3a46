//! # retouch-session
//!
//! Edit state for the retouch photo pipeline.
//!
//! - [`history`] - Bounded undo/redo stack of buffer snapshots
//! - [`preset`] - Named adjustment records
//! - [`config`] - YAML editor settings
//! - [`session`] - [`EditSession`], tying the above to one open image
//!
//! # Example
//!
//! ```rust
//! use retouch_core::PixelBuffer;
//! use retouch_session::{EditSession, EditorConfig};
//!
//! let config = EditorConfig::from_yaml_str("history: { capacity: 10 }").unwrap();
//! let img = PixelBuffer::filled(16, 16, [90, 120, 150, 255]).unwrap();
//! let mut session = EditSession::with_config(img, &config);
//!
//! session.apply_preset("warm").unwrap();
//! session.apply_filter("clarendon").unwrap();
//! assert_eq!(session.history().len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod config;
pub mod history;
pub mod preset;
pub mod session;

pub use config::{EditorConfig, LookDefinition};
pub use error::{SessionError, SessionResult};
pub use history::{HistoryEntry, HistoryItem, HistoryLimits, HistoryStack};
pub use preset::{Preset, PresetBook};
pub use session::{EditSession, TransformOp};
