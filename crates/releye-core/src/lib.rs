//! RelEye Core Library
//!
//! Relationship-network workspaces with encrypted export.
//!
//! ## Overview
//!
//! RelEye manages "workspaces" - editable relationship networks of people,
//! connections, and groups, plus the canvas view state used to render them.
//! Workspaces live in a local embedded database, can be exported as
//! passphrase-encrypted vault files, and render into markdown reports.
//!
//! ## Core Principles
//!
//! - **Local-first**: the graph lives in an embedded store; no server needed
//! - **Encrypted export**: vault files use PBKDF2 + AES-256-GCM; only the
//!   passphrase opens them
//! - **Whole-document persistence**: every mutation persists the full graph,
//!   so the on-disk state is never ahead of or behind the UI
//!
//! ## Quick Start
//!
//! ```no_run
//! use releye_core::RelEyeEngine;
//! use releye_core::types::ConnectionKind;
//!
//! fn main() -> Result<(), releye_core::RelEyeError> {
//!     let mut engine = RelEyeEngine::new("~/.releye/data")?;
//!
//!     // Create a workspace
//!     let ws = engine.create_workspace("Family")?;
//!
//!     // Add people and connect them
//!     let ada = engine.add_person(&ws, "Ada")?;
//!     let grace = engine.add_person(&ws, "Grace")?;
//!     engine.add_connection(&ws, &ada, &grace, ConnectionKind::Family)?;
//!
//!     // Render a report
//!     println!("{}", engine.report(&ws, &Default::default())?);
//!
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod graph;
pub mod invite;
pub mod report;
pub mod storage;
pub mod types;
pub mod vault;

// Re-exports
pub use engine::RelEyeEngine;
pub use error::{RelEyeError, RelEyeResult};
pub use graph::GraphDoc;
pub use invite::InviteToken;
pub use report::{generate_report, write_report, NetworkStats, ReportOptions};
pub use storage::Storage;
pub use types::*;
pub use vault::{open_workspace, seal_workspace, GraphCrypto};
