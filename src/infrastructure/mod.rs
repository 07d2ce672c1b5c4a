pub mod graph;
pub mod http_client;
pub mod logging;
pub mod port;
pub mod services;
