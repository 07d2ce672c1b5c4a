//! Core domain types: query safety, directory records, email extraction
//! and invite outcomes.

pub mod email;
pub mod error;
pub mod filter;
pub mod invite;
pub mod member;

pub use email::extract_email;
pub use error::SyncError;
pub use filter::{build_filter, sanitize_value};
pub use invite::{InviteOutcome, SyncReport};
pub use member::{DirectoryMember, Group, GRAPH_USER_TYPE};
