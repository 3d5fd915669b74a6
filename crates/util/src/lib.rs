//! Request plumbing shared by the routebind engine and CLI: url-encoded value
//! maps, route templates, and configuration loading.

pub mod config;
pub mod route;
pub mod value_map;

pub use config::{BindConfig, CONFIG_PATH_ENV, ConfigError, default_config_path, expand_tilde};
pub use route::{PathVariables, RouteMatch, RouteTemplate, RouteTemplateError, Router};
pub use value_map::ValueMap;
