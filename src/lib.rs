//! entra-port-sync
//!
//! Synchronizes the membership of a Microsoft Entra ID group into Port:
//! - resolves the group by display name via Microsoft Graph
//! - expands transitive membership, keeping user objects only
//! - extracts and validates one email per member
//! - sends a Port invite per unique email, tolerating partial failures

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{AppConfig, SyncConfig};
pub use domain::{SyncError, SyncReport};
