//! Эксклюзивный запуск: в каждый момент жив не более чем один отслеживаемый
//! UI-помощник, повторный вызов того же приложения его закрывает.

mod teardown;
mod watchdog;

pub use teardown::Teardown;
pub use watchdog::Watchdog;

use crate::config::{AppSpec, Config};
use crate::error::{LauncherError, Result};
use crate::services::{AppSpawner, Compositor, ProcessController, ProcessReaper};
use crate::state::{StateStore, TrackedRecord};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Что лежит в файле состояния на момент вызова
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Empty,
    Live(TrackedRecord),
    Stale(TrackedRecord),
    Corrupt(String),
}

impl Observation {
    fn occupant(self) -> Option<TrackedRecord> {
        match self {
            Observation::Live(record) => Some(record),
            _ => None,
        }
    }
}

/// Решение, принятое по согласованному состоянию
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Запрошенное приложение уже открыто: закрыть его и выйти
    ToggleOff(TrackedRecord),
    /// Снести предыдущего владельца (если есть) и запустить приложение
    Launch { replace: Option<TrackedRecord> },
}

pub fn plan(app: &str, occupant: Option<TrackedRecord>) -> Action {
    match occupant {
        Some(record) if record.app_name == app => Action::ToggleOff(record),
        replace => Action::Launch { replace },
    }
}

/// Чем закончился вызов
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    ToggledOff(TrackedRecord),
    Exited {
        record: TrackedRecord,
        code: Option<i32>,
    },
    Interrupted(TrackedRecord),
}

/// Текст подсказки для неверного или отсутствующего имени приложения
pub fn usage_message(program: &str, config: &Config) -> String {
    format!(
        "Usage: {} <app-name>\nAvailable: {}",
        program,
        config.app_names().join(", ")
    )
}

pub struct Launcher {
    config: Arc<Config>,
    store: Arc<dyn StateStore>,
    processes: Arc<dyn ProcessController>,
    spawner: Arc<dyn AppSpawner>,
    teardown: Teardown,
}

impl Launcher {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn StateStore>,
        processes: Arc<dyn ProcessController>,
        compositor: Arc<dyn Compositor>,
        spawner: Arc<dyn AppSpawner>,
    ) -> Self {
        let reaper = ProcessReaper::new(
            processes.clone(),
            config.timing.grace_period(),
            config.timing.poll_interval(),
        );
        let teardown = Teardown::new(reaper, compositor, config.timing.compositor_timeout());

        Self {
            config,
            store,
            processes,
            spawner,
            teardown,
        }
    }

    fn spec(&self, app: &str) -> Result<&AppSpec> {
        self.config
            .app(app)
            .ok_or_else(|| LauncherError::UnknownApp(app.to_string()))
    }

    fn window_class_of(&self, app: &str) -> Option<&str> {
        self.config.app(app)?.window_class.as_deref()
    }

    /// Прочитать состояние без изменений
    pub fn observe(&self) -> Observation {
        match self.store.read() {
            Ok(None) => Observation::Empty,
            Ok(Some(record)) if self.processes.is_alive(record.pid) => Observation::Live(record),
            Ok(Some(record)) => Observation::Stale(record),
            Err(e) => Observation::Corrupt(e.to_string()),
        }
    }

    /// Прочитать состояние и убрать устаревшую или испорченную запись
    pub fn reconcile(&self) -> Option<TrackedRecord> {
        let observation = self.observe();

        match &observation {
            Observation::Stale(record) => {
                debug!("Запись {} устарела: процесс не существует", record);
                self.clear_state();
            }
            Observation::Corrupt(reason) => {
                debug!("Файл состояния испорчен ({}), удаляем", reason);
                self.clear_state();
            }
            Observation::Empty | Observation::Live(_) => {}
        }

        observation.occupant()
    }

    fn clear_state(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Не удалось удалить файл состояния: {}", e);
        }
    }

    fn clear_state_if_owner(&self, record: &TrackedRecord) {
        match self.store.clear_if_owner(record) {
            Ok(true) => debug!("Запись {} снята", record),
            Ok(false) => debug!("Запись {} уже заменена, не трогаем", record),
            Err(e) => debug!("Не удалось проверить запись {}: {}", record, e),
        }
    }

    /// Снести владельца записи и удалить файл состояния
    async fn retire(&self, record: &TrackedRecord) {
        self.teardown
            .terminate(record.pid, self.window_class_of(&record.app_name))
            .await;
        self.clear_state();
    }

    /// Добить посторонние экземпляры перед запуском
    async fn sweep(&self, spec: &AppSpec) {
        for name in &spec.sweep_names {
            let pids = match self.processes.pids_by_name(name).await {
                Ok(pids) => pids,
                Err(e) => {
                    debug!("Поиск процессов {} не удался: {}", name, e);
                    continue;
                }
            };

            for pid in pids {
                debug!("Добиваем постороннего {} (pid {})", name, pid);
                self.teardown.reaper().terminate_tree(pid).await;
            }
        }

        if let Some(class) = spec.window_class.as_deref() {
            self.teardown.close_window_class(class).await;
        }
    }

    /// Что будет сделано для `app`, без побочных эффектов
    pub fn dry_run(&self, app: &str) -> Result<Action> {
        let spec = self.spec(app)?;
        let observation = self.observe();
        info!("Dry-run: состояние {:?}", observation);

        let action = plan(app, observation.occupant());
        match &action {
            Action::ToggleOff(record) => info!("Dry-run: закрыли бы {}", record),
            Action::Launch { replace } => {
                if let Some(record) = replace {
                    info!("Dry-run: снесли бы {}", record);
                }
                info!(
                    "Dry-run: запустили бы {} как {:?} (окно через композитор: {})",
                    app,
                    spec.command.resolve()?,
                    spec.is_compositor_managed()
                );
            }
        }

        Ok(action)
    }

    /// Полный цикл: согласование, переключение или замена, запуск, ожидание.
    ///
    /// `interrupt` завершается, когда пользователь прерывает ожидание (Ctrl+C).
    pub async fn run<F>(&self, app: &str, interrupt: F) -> Result<Outcome>
    where
        F: Future<Output = ()> + Send,
    {
        let spec = self.spec(app)?;
        let occupant = self.reconcile();

        let replace = match plan(app, occupant) {
            Action::ToggleOff(record) => {
                info!("{} уже открыт, закрываем", record);
                self.retire(&record).await;
                return Ok(Outcome::ToggledOff(record));
            }
            Action::Launch { replace } => replace,
        };

        if let Some(previous) = replace {
            info!("Сносим предыдущего владельца {}", previous);
            self.retire(&previous).await;
        }

        self.sweep(spec).await;
        tokio::time::sleep(self.config.timing.settle_delay()).await;

        let argv = spec.command.resolve()?;
        let mut handle = self.spawner.spawn(app, &argv)?;
        let record = TrackedRecord::new(handle.pid(), app);

        if let Err(e) = self.store.commit_atomic(&record) {
            warn!("Не удалось записать состояние {}: {}", record, e);
            self.teardown
                .terminate(record.pid, spec.window_class.as_deref())
                .await;
            return Err(e);
        }
        info!("Владелец: {}", record);

        let watchdog = Watchdog::new(
            self.store.clone(),
            self.teardown.clone(),
            record.clone(),
            spec.window_class.clone(),
            self.config.timing.watchdog_timeout(),
        )
        .arm();

        let outcome = tokio::select! {
            status = handle.wait() => {
                let code = match status {
                    Ok(code) => code,
                    Err(e) => {
                        warn!("Ошибка ожидания {}: {}", record, e);
                        None
                    }
                };
                info!("{} завершился (код {:?})", record, code);
                self.clear_state_if_owner(&record);
                Outcome::Exited { record, code }
            }
            _ = interrupt => {
                info!("Прерывание, закрываем {}", record);
                self.teardown
                    .terminate(record.pid, spec.window_class.as_deref())
                    .await;
                self.clear_state_if_owner(&record);
                Outcome::Interrupted(record)
            }
        };

        if watchdog.disarm().await {
            debug!("Сторожевой таймер успел сработать до завершения ожидания");
        }
        Ok(outcome)
    }
}
