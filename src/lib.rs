/// Authentication and ACL: backends, credential chain, topic rules.
pub mod auth;
/// Plugin options loading (broker config, files, environment).
pub mod config;
/// Flexible logging (formatting, filters, sinks).
pub mod logging;
/// Broker-facing entry points and status codes.
pub mod plugin;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Backends, chain, ACL evaluation, password records.
pub use auth::{
    hash_password, matches_filter, verify, Access, AclEvaluator, AclOrder, Backend, BackendChain,
    BackendFactory, BackendRegistry, Digest, HashParams, TopicTemplate, MAX_BACKENDS,
};
/// Error types shared with the host.
pub use authplug_error::{
    AuthplugResult, BackendError, ConfigError, ErrorExt, PasswordError, StackError, StatusCode,
};
/// Plugin options.
pub use config::AuthOptions;
/// Logging setup.
pub use logging::{init_logging, LogFormat, LoggingConfig, LoggingHandle};
/// Plugin entry points.
pub use plugin::{AuthPlugin, PluginStatus};
