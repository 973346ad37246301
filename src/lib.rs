//! Games catalog REST API with an image relay.

pub mod config;
pub mod games;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::AppConfig;
pub use games::GameStore;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::ImageRelay;
