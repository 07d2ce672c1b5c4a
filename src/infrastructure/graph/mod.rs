//! Microsoft Graph integration: token acquisition, authenticated transport,
//! group lookup and transitive-membership pagination.

pub mod auth;
pub mod client;
pub mod groups;
pub mod members;

pub use auth::TokenProvider;
pub use client::{GraphClient, ODataPage};
pub use groups::find_group;
pub use members::TransitiveMembersPager;
