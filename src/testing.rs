//! Подделки внешних возможностей для тестов лаунчера

use crate::error::{LauncherError, Result};
use crate::services::spawner::{AppHandle, AppSpawner};
use crate::services::{Compositor, ProcessController};
use crate::state::{StateStore, TrackedRecord};
use nix::errno::Errno;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sig {
    Term,
    Kill,
}

#[derive(Default)]
struct ProcessTable {
    alive: HashSet<u32>,
    children: HashMap<u32, Vec<u32>>,
    names: HashMap<u32, String>,
    stubborn: HashSet<u32>,
    signals: Vec<(u32, Sig)>,
}

/// Таблица процессов в памяти
#[derive(Default)]
pub struct MockProcessController {
    table: Mutex<ProcessTable>,
}

impl MockProcessController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_process(&self, pid: u32, parent: Option<u32>) {
        let mut table = self.table.lock();
        table.alive.insert(pid);
        if let Some(parent) = parent {
            table.children.entry(parent).or_default().push(pid);
        }
    }

    pub fn add_named(&self, pid: u32, name: &str) {
        self.add_process(pid, None);
        self.table.lock().names.insert(pid, name.to_string());
    }

    pub fn link_child(&self, parent: u32, child: u32) {
        self.table.lock().children.entry(parent).or_default().push(child);
    }

    /// Процесс игнорирует SIGTERM
    pub fn make_stubborn(&self, pid: u32) {
        self.table.lock().stubborn.insert(pid);
    }

    /// Процесс завершился сам
    pub fn exit(&self, pid: u32) {
        self.table.lock().alive.remove(&pid);
    }

    pub fn signals(&self) -> Vec<(u32, Sig)> {
        self.table.lock().signals.clone()
    }

    pub fn signalled(&self, pid: u32) -> bool {
        self.table.lock().signals.iter().any(|(p, _)| *p == pid)
    }
}

#[async_trait::async_trait]
impl ProcessController for MockProcessController {
    async fn children(&self, pid: u32) -> Result<Vec<u32>> {
        let table = self.table.lock();
        Ok(table
            .children
            .get(&pid)
            .map(|children| {
                children
                    .iter()
                    .copied()
                    .filter(|child| table.alive.contains(child))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn pids_by_name(&self, name: &str) -> Result<Vec<u32>> {
        let table = self.table.lock();
        let mut pids: Vec<u32> = table
            .names
            .iter()
            .filter(|(pid, n)| n.as_str() == name && table.alive.contains(*pid))
            .map(|(pid, _)| *pid)
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.table.lock().alive.contains(&pid)
    }

    fn terminate_gracefully(&self, pid: u32) -> Result<()> {
        let mut table = self.table.lock();
        if !table.alive.contains(&pid) {
            return Err(Errno::ESRCH.into());
        }
        table.signals.push((pid, Sig::Term));
        if !table.stubborn.contains(&pid) {
            table.alive.remove(&pid);
        }
        Ok(())
    }

    fn kill(&self, pid: u32) -> Result<()> {
        let mut table = self.table.lock();
        if !table.alive.remove(&pid) {
            return Err(Errno::ESRCH.into());
        }
        table.signals.push((pid, Sig::Kill));
        Ok(())
    }
}

/// Композитор, запоминающий закрытые классы
#[derive(Default)]
pub struct MockCompositor {
    closed: Mutex<Vec<String>>,
    hang: AtomicBool,
    fail: AtomicBool,
    ends: Mutex<Option<(Arc<MockProcessController>, u32)>>,
}

impl MockCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hanging() -> Self {
        let compositor = Self::new();
        compositor.hang.store(true, Ordering::SeqCst);
        compositor
    }

    pub fn failing() -> Self {
        let compositor = Self::new();
        compositor.fail.store(true, Ordering::SeqCst);
        compositor
    }

    /// Закрытие окна завершает процесс `pid`, как у настоящего приложения
    pub fn ending_process(processes: Arc<MockProcessController>, pid: u32) -> Self {
        let compositor = Self::new();
        *compositor.ends.lock() = Some((processes, pid));
        compositor
    }

    pub fn closed(&self) -> Vec<String> {
        self.closed.lock().clone()
    }
}

#[async_trait::async_trait]
impl Compositor for MockCompositor {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn close_class(&self, class: &str) -> Result<()> {
        self.closed.lock().push(class.to_string());

        if let Some((processes, pid)) = self.ends.lock().as_ref() {
            processes.exit(*pid);
        }

        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(LauncherError::Compositor("mock failure".to_string()));
        }

        Ok(())
    }
}

/// Запуск «процессов» в MockProcessController.
///
/// Каждый запуск получает pid, кратный 10; с `with_children` у процесса
/// появляется потомок `pid + 1` (как kitty → clipse).
pub struct MockSpawner {
    processes: Arc<MockProcessController>,
    next_pid: AtomicU32,
    with_children: AtomicBool,
    fail: AtomicBool,
    launches: Mutex<Vec<(String, Vec<String>)>>,
    probe: Mutex<Option<Arc<dyn StateStore>>>,
    state_at_spawn: Mutex<Vec<Option<TrackedRecord>>>,
}

impl MockSpawner {
    pub fn new(processes: Arc<MockProcessController>) -> Self {
        Self {
            processes,
            next_pid: AtomicU32::new(1000),
            with_children: AtomicBool::new(false),
            fail: AtomicBool::new(false),
            launches: Mutex::new(Vec::new()),
            probe: Mutex::new(None),
            state_at_spawn: Mutex::new(Vec::new()),
        }
    }

    /// Запоминать содержимое хранилища в момент каждого запуска
    pub fn probe_store(&self, store: Arc<dyn StateStore>) {
        *self.probe.lock() = Some(store);
    }

    pub fn state_at_spawn(&self) -> Vec<Option<TrackedRecord>> {
        self.state_at_spawn.lock().clone()
    }

    pub fn spawn_children(&self) {
        self.with_children.store(true, Ordering::SeqCst);
    }

    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn launches(&self) -> Vec<(String, Vec<String>)> {
        self.launches.lock().clone()
    }
}

impl AppSpawner for MockSpawner {
    fn spawn(&self, app: &str, argv: &[String]) -> Result<Box<dyn AppHandle>> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(LauncherError::Spawn {
                app: app.to_string(),
                source: std::io::ErrorKind::NotFound.into(),
            });
        }

        if let Some(store) = self.probe.lock().as_ref() {
            self.state_at_spawn.lock().push(store.read().ok().flatten());
        }

        let pid = self.next_pid.fetch_add(10, Ordering::SeqCst);
        self.processes.add_process(pid, None);
        if self.with_children.load(Ordering::SeqCst) {
            self.processes.add_process(pid + 1, Some(pid));
        }
        self.launches.lock().push((app.to_string(), argv.to_vec()));

        Ok(Box::new(MockHandle {
            pid,
            processes: self.processes.clone(),
        }))
    }
}

struct MockHandle {
    pid: u32,
    processes: Arc<MockProcessController>,
}

#[async_trait::async_trait]
impl AppHandle for MockHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    async fn wait(&mut self) -> Result<Option<i32>> {
        while self.processes.is_alive(self.pid) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(Some(0))
    }
}
