//! Typed records for directory objects returned by Microsoft Graph.

use serde::Deserialize;

/// OData type discriminator Graph attaches to user objects.
pub const GRAPH_USER_TYPE: &str = "#microsoft.graph.user";

/// A resolved directory group.
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

/// A single entry from a transitive-membership listing.
///
/// Transitive listings mix users with nested groups, devices and service
/// principals; the discriminator tells them apart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryMember {
    #[serde(default)]
    pub id: String,
    pub display_name: Option<String>,
    pub mail: Option<String>,
    pub user_principal_name: Option<String>,
    #[serde(rename = "@odata.type")]
    pub odata_type: Option<String>,
}

impl DirectoryMember {
    /// Returns true when this entry is a user object.
    pub fn is_user(&self) -> bool {
        self.odata_type.as_deref() == Some(GRAPH_USER_TYPE)
    }
}
