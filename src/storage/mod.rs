//! Storage for settings, the routing config, and the sync marker.

pub mod config;
pub mod marker;
pub mod paths;
pub mod routing_config;

pub use config::{
    ConfigSource, ConfigSources, ENV_CONFIG, ENV_FORMAT, ENV_NO_COLOR, ENV_NO_COLOR_STD,
    ENV_PRETTY, ENV_PROBE_TIMEOUT, ENV_PROXY_URL, ENV_ROUTING_CONFIG, ENV_TIMEOUT,
    ResolvedSettings, Settings,
};
pub use marker::SyncMarker;
pub use paths::AppPaths;
pub use routing_config::{RoutingConfig, SubAccount};
