use std::{fmt, str::FromStr};

use authplug_error::ConfigError;
use globset::{Glob, GlobMatcher};
use tracing::debug;

use super::{Access, BackendChain, TopicTemplate};
use crate::config::AuthOptions;

/// Что опрашивается первым: бэкенды или шаблон `topic_prefix`.
///
/// На итоговое решение порядок не влияет (это логическое ИЛИ), только на
/// то, будет ли обращение к хранилищу для топиков, покрытых шаблоном.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AclOrder {
    #[default]
    BackendsFirst,
    TemplateFirst,
}

impl FromStr for AclOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backends-first" | "backends_first" => Ok(Self::BackendsFirst),
            "template-first" | "template_first" => Ok(Self::TemplateFirst),
            other => Err(ConfigError::InvalidOption {
                key: "acl_order".to_string(),
                reason: format!("expected `backends-first` or `template-first`, got `{other}`"),
            }),
        }
    }
}

impl fmt::Display for AclOrder {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::BackendsFirst => f.write_str("backends-first"),
            Self::TemplateFirst => f.write_str("template-first"),
        }
    }
}

/// Проверка доступа к топикам.
///
/// Порядок шагов (первый решающий выигрывает):
/// 1. пустое имя пользователя или топик: отказ;
/// 2. совпадение с glob-шаблоном `superusers`: разрешено;
/// 3. бэкенды и шаблон `topic_prefix` в порядке [`AclOrder`];
/// 4. иначе отказ.
#[derive(Debug, Clone, Default)]
pub struct AclEvaluator {
    superusers: Option<GlobMatcher>,
    template: Option<TopicTemplate>,
    order: AclOrder,
}

impl AclEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Читает `superusers`, `topic_prefix` и `acl_order`.
    pub fn from_options(opts: &AuthOptions) -> Result<Self, ConfigError> {
        let mut evaluator = Self::new();

        if let Some(pattern) = opts.get_non_empty("superusers") {
            evaluator = evaluator.with_superusers(pattern)?;
        }
        if let Some(template) = opts.get_non_empty("topic_prefix") {
            evaluator = evaluator.with_template(TopicTemplate::new(template));
        }
        if let Some(order) = opts.get_non_empty("acl_order") {
            evaluator = evaluator.with_order(order.parse()?);
        }

        Ok(evaluator)
    }

    /// Glob по имени пользователя. `*` совпадает и через `/`.
    pub fn with_superusers(
        mut self,
        pattern: &str,
    ) -> Result<Self, ConfigError> {
        let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidOption {
            key: "superusers".to_string(),
            reason: e.to_string(),
        })?;
        self.superusers = Some(glob.compile_matcher());
        Ok(self)
    }

    pub fn with_template(
        mut self,
        template: TopicTemplate,
    ) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_order(
        mut self,
        order: AclOrder,
    ) -> Self {
        self.order = order;
        self
    }

    pub fn order(&self) -> AclOrder {
        self.order
    }

    pub fn template(&self) -> Option<&TopicTemplate> {
        self.template.as_ref()
    }

    pub fn is_superuser(
        &self,
        username: &str,
    ) -> bool {
        self.superusers
            .as_ref()
            .is_some_and(|m| m.is_match(username))
    }

    fn template_permits(
        &self,
        username: &str,
        topic: &str,
    ) -> bool {
        self.template
            .as_ref()
            .is_some_and(|t| t.permits(username, topic))
    }

    /// Решает, разрешён ли клиенту доступ `access` к `topic`.
    ///
    /// `client_id` сейчас используется только для логов.
    pub fn check(
        &self,
        chain: &BackendChain,
        client_id: &str,
        username: &str,
        topic: &str,
        access: Access,
    ) -> bool {
        if username.is_empty() || topic.is_empty() {
            debug!(client_id, "empty username or topic, denied");
            return false;
        }

        if self.is_superuser(username) {
            debug!(client_id, username, topic, %access, "global superuser");
            return true;
        }

        let allowed = match self.order {
            AclOrder::BackendsFirst => {
                chain.permits(username, topic, access) || self.template_permits(username, topic)
            }
            AclOrder::TemplateFirst => {
                self.template_permits(username, topic) || chain.permits(username, topic, access)
            }
        };

        debug!(client_id, username, topic, %access, allowed, "acl decision");
        allowed
    }
}
