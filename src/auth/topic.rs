//! Topic templates and MQTT wildcard matching.
//!
//! Supports MQTT wildcards:
//! - `+` matches exactly one topic level
//! - `#` matches the parent level and any number of remaining levels (must be
//!   last)

use tracing::debug;

/// Символ-заполнитель в шаблоне, заменяемый именем пользователя.
pub const PLACEHOLDER: char = '%';

/// Шаблон топика с плейсхолдерами `%` (ключ `topic_prefix`).
///
/// Неизменяем после создания; раскрытие создаёт новую строку на каждый вызов.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicTemplate {
    pattern: String,
    placeholders: usize,
}

impl TopicTemplate {
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let placeholders = pattern.matches(PLACEHOLDER).count();
        Self {
            pattern,
            placeholders,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Количество плейсхолдеров в шаблоне.
    pub fn placeholders(&self) -> usize {
        self.placeholders
    }

    /// Ёмкость буфера для раскрытия с данным именем пользователя.
    pub fn expanded_capacity(
        &self,
        username: &str,
    ) -> usize {
        self.pattern.len() + self.placeholders * username.len()
    }

    /// Заменяет каждый `%` копией `username`; остальные символы копируются
    /// как есть.
    pub fn expand(
        &self,
        username: &str,
    ) -> String {
        let mut out = String::with_capacity(self.expanded_capacity(username));
        for ch in self.pattern.chars() {
            if ch == PLACEHOLDER {
                out.push_str(username);
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Проверяет, разрешает ли шаблон, раскрытый для `username`, доступ к
    /// `topic`.
    ///
    /// Точное совпадение, затем совпадение по wildcard-фильтру. Шаблон,
    /// оканчивающийся на `/`, задаёт префикс иерархии и покрывает всё ниже.
    /// Имя с символами `+`/`#` не подставляется: раскрытый шаблон вышел бы
    /// за пределы топиков пользователя.
    pub fn permits(
        &self,
        username: &str,
        topic: &str,
    ) -> bool {
        if self.placeholders > 0 && username.contains(['+', '#']) {
            debug!(username, "wildcard characters in username, template skipped");
            return false;
        }
        let expanded = self.expand(username);
        if expanded == topic {
            return true;
        }
        if matches_filter(&expanded, topic) {
            return true;
        }
        if expanded.ends_with('/') {
            let mut subtree = expanded;
            subtree.push('#');
            return matches_filter(&subtree, topic);
        }
        false
    }
}

/// Сопоставляет имя топика с фильтром подписки по правилам MQTT.
///
/// Некорректный фильтр (wildcard внутри уровня, `#` не в конце) и топики с
/// символами `+`/`#` никогда не совпадают. Топики, начинающиеся с `$`, не
/// совпадают с фильтрами, первый уровень которых — wildcard.
pub fn matches_filter(
    filter: &str,
    topic: &str,
) -> bool {
    if filter.is_empty() || topic.is_empty() {
        return false;
    }
    if topic.contains(['+', '#']) {
        return false;
    }
    if topic.starts_with('$') && (filter.starts_with('+') || filter.starts_with('#')) {
        return false;
    }

    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');

    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return filter_levels.next().is_none(),
            (Some("+"), Some(_)) => {}
            (Some(f), Some(t)) => {
                if f.contains(['+', '#']) || f != t {
                    return false;
                }
            }
            (None, None) => return true,
            _ => return false,
        }
    }
}
