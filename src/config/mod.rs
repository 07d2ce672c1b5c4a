pub mod app_config;
pub mod group_name;
pub mod sync_config;

pub use app_config::{AppConfig, GraphConfig, LogFormat, LoggingConfig, PortConfig};
pub use group_name::resolve_group_name;
pub use sync_config::SyncConfig;
