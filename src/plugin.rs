//! Broker-facing entry points.
//!
//! The host calls [`AuthPlugin::init`] once with the plugin options, then
//! invokes the checks concurrently from its worker threads and finally
//! [`AuthPlugin::cleanup`].

use std::fmt;

use authplug_error::{AuthplugResult, ResultExt, StackError};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use tracing::{debug, error, info, warn};

use crate::{
    auth::{Access, AclEvaluator, BackendChain, BackendRegistry},
    config::AuthOptions,
};

/// Коды ответа брокеру (совпадают с числовыми кодами брокера).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum PluginStatus {
    Success = 0,
    Auth = 11,
    AclDenied = 12,
    Unknown = 13,
}

impl PluginStatus {
    pub fn code(self) -> i32 {
        self.into()
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Auth => "authentication failed",
            Self::AclDenied => "acl denied",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Состояние плагина между init и cleanup.
pub struct AuthPlugin {
    chain: BackendChain,
    acl: AclEvaluator,
}

impl AuthPlugin {
    /// Инициализация со встроенными бэкендами.
    pub fn init(opts: AuthOptions) -> AuthplugResult<Self> {
        Self::init_with_registry(&BackendRegistry::with_builtin(), opts)
    }

    /// Инициализация с реестром, в который хост мог добавить свои бэкенды.
    ///
    /// Любая ошибка фатальна: брокер не должен обслуживать клиентов.
    pub fn init_with_registry(
        registry: &BackendRegistry,
        opts: AuthOptions,
    ) -> AuthplugResult<Self> {
        let acl = AclEvaluator::from_options(&opts)
            .context("plugin init")
            .inspect_err(log_init_failure)?;
        let chain = registry
            .build_chain(&opts)
            .context("building backend chain")
            .context("plugin init")
            .inspect_err(log_init_failure)?;

        info!(
            backends = ?chain.names(),
            superusers = opts.get_non_empty("superusers").is_some(),
            topic_prefix = opts.get_non_empty("topic_prefix").unwrap_or(""),
            acl_order = %acl.order(),
            "auth plugin initialized"
        );

        Ok(Self { chain, acl })
    }

    pub fn chain(&self) -> &BackendChain {
        &self.chain
    }

    pub fn unpwd_check(
        &self,
        username: &str,
        password: &str,
    ) -> PluginStatus {
        if self.chain.check_credential(username, password) {
            PluginStatus::Success
        } else {
            PluginStatus::Auth
        }
    }

    /// Проверка доступа. `access` принимает [`Access`] или числовой код
    /// брокера; неизвестный код означает отказ.
    pub fn acl_check(
        &self,
        client_id: &str,
        username: &str,
        topic: &str,
        access: impl TryInto<Access>,
    ) -> PluginStatus {
        let Ok(access): Result<Access, _> = access.try_into() else {
            warn!(client_id, username, topic, "unknown access code, denied");
            return PluginStatus::AclDenied;
        };

        if self.acl.check(&self.chain, client_id, username, topic, access) {
            PluginStatus::Success
        } else {
            PluginStatus::AclDenied
        }
    }

    /// PSK не поддерживается: всегда отказ.
    pub fn psk_key_get(
        &self,
        hint: &str,
        identity: &str,
    ) -> PluginStatus {
        debug!(hint, identity, "psk lookup not supported");
        PluginStatus::Auth
    }

    /// Освобождает все бэкенды.
    pub fn cleanup(self) {
        self.chain.teardown();
        info!("auth plugin cleaned up");
    }
}

fn log_init_failure(err: &StackError) {
    error!(code = %err.status_code(), fatal = err.is_fatal(), error = %err, "auth plugin init failed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(PluginStatus::Success.code(), 0);
        assert_eq!(PluginStatus::Auth.code(), 11);
        assert_eq!(PluginStatus::AclDenied.code(), 12);
        assert_eq!(PluginStatus::Unknown.code(), 13);
        assert_eq!(PluginStatus::try_from(12).unwrap(), PluginStatus::AclDenied);
        assert!(PluginStatus::try_from(1).is_err());
    }

    #[test]
    fn test_init_without_backends_is_fatal() {
        let err = match AuthPlugin::init(AuthOptions::new()) {
            Ok(_) => panic!("init must fail"),
            Err(e) => e,
        };
        assert!(err.is_fatal());
        assert!(err.to_string().starts_with("plugin init: building backend chain: "));
    }

    #[test]
    fn test_invalid_acl_order_is_fatal() {
        let opts = AuthOptions::from_pairs([("backends", "sqlite"), ("acl_order", "sideways")]);
        let err = match AuthPlugin::init(opts) {
            Ok(_) => panic!("init must fail"),
            Err(e) => e,
        };
        assert!(err.downcast_ref::<authplug_error::ConfigError>().is_some());
    }
}
