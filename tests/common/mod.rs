//! Общие помощники для интеграционных тестов.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use authplug::{hash_password, Access, Backend, BackendRegistry, HashParams};

/// Быстрые параметры хеширования для тестов.
pub fn fast_params() -> HashParams {
    HashParams {
        iterations: 10,
        ..HashParams::default()
    }
}

pub fn record(password: &str) -> String {
    hash_password(password, &fast_params()).expect("hashing")
}

/// Счётчики вызовов одного мок-бэкенда.
#[derive(Debug, Default)]
pub struct Calls {
    pub get_user: AtomicUsize,
    pub is_superuser: AtomicUsize,
    pub acl_check: AtomicUsize,
    pub teardown: AtomicUsize,
}

impl Calls {
    pub fn get_user(&self) -> usize {
        self.get_user.load(Ordering::SeqCst)
    }

    pub fn acl(&self) -> usize {
        self.acl_check.load(Ordering::SeqCst)
    }

    pub fn teardowns(&self) -> usize {
        self.teardown.load(Ordering::SeqCst)
    }
}

/// Бэкенд в памяти с подсчётом обращений.
#[derive(Default)]
pub struct MockBackend {
    pub name: String,
    pub users: HashMap<String, String>,
    pub superusers: HashSet<String>,
    /// (username, topic) -> маска доступа
    pub acls: HashMap<(String, String), u8>,
    pub calls: Arc<Calls>,
    pub teardown_log: Option<Arc<Mutex<Vec<String>>>>,
}

impl MockBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_user(
        mut self,
        username: &str,
        password: &str,
    ) -> Self {
        self.users.insert(username.to_string(), record(password));
        self
    }

    pub fn with_raw_record(
        mut self,
        username: &str,
        stored: &str,
    ) -> Self {
        self.users.insert(username.to_string(), stored.to_string());
        self
    }

    pub fn with_superuser(
        mut self,
        username: &str,
    ) -> Self {
        self.superusers.insert(username.to_string());
        self
    }

    pub fn with_acl(
        mut self,
        username: &str,
        topic: &str,
        mask: u8,
    ) -> Self {
        self.acls
            .insert((username.to_string(), topic.to_string()), mask);
        self
    }

    pub fn with_teardown_log(
        mut self,
        log: Arc<Mutex<Vec<String>>>,
    ) -> Self {
        self.teardown_log = Some(log);
        self
    }

    pub fn calls(&self) -> Arc<Calls> {
        self.calls.clone()
    }

    pub fn boxed(self) -> Box<dyn Backend> {
        Box::new(self)
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_user(
        &self,
        username: &str,
    ) -> Option<String> {
        self.calls.get_user.fetch_add(1, Ordering::SeqCst);
        self.users.get(username).cloned()
    }

    fn is_superuser(
        &self,
        username: &str,
    ) -> bool {
        self.calls.is_superuser.fetch_add(1, Ordering::SeqCst);
        self.superusers.contains(username)
    }

    fn acl_check(
        &self,
        username: &str,
        topic: &str,
        access: Access,
    ) -> bool {
        self.calls.acl_check.fetch_add(1, Ordering::SeqCst);
        self.acls
            .get(&(username.to_string(), topic.to_string()))
            .is_some_and(|mask| access.is_in(*mask))
    }

    fn teardown(&self) {
        self.calls.teardown.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.teardown_log {
            log.lock().unwrap().push(self.name.clone());
        }
    }
}

/// Регистрирует фабрику, которая отдаёт заранее подготовленный бэкенд.
///
/// Фабрику можно вызвать только один раз; счётчик вызовов возвращается.
pub fn register_prepared(
    registry: &mut BackendRegistry,
    kind: &str,
    backend: MockBackend,
) -> Arc<AtomicUsize> {
    let invocations = Arc::new(AtomicUsize::new(0));
    let slot = Mutex::new(Some(backend));
    let counter = invocations.clone();
    registry.register(kind, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        let backend = slot
            .lock()
            .unwrap()
            .take()
            .expect("prepared backend used twice");
        Ok(backend.boxed())
    });
    invocations
}
