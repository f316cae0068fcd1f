use super::teardown::Teardown;
use crate::state::{StateStore, TrackedRecord};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const ARMED: u8 = 0;
const FIRING: u8 = 1;
const DISARMED: u8 = 2;

/// Отложенный снос запущенного приложения по таймауту.
///
/// Задача отсоединена от ожидания приложения. Начатый снос не прерывается:
/// `disarm` дожидается его окончания.
pub struct Watchdog {
    store: Arc<dyn StateStore>,
    teardown: Teardown,
    record: TrackedRecord,
    window_class: Option<String>,
    timeout: Duration,
}

/// Взведённый таймер
pub struct ArmedWatchdog {
    task: JoinHandle<bool>,
    state: Arc<AtomicU8>,
}

impl Watchdog {
    pub fn new(
        store: Arc<dyn StateStore>,
        teardown: Teardown,
        record: TrackedRecord,
        window_class: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            teardown,
            record,
            window_class,
            timeout,
        }
    }

    pub fn arm(self) -> ArmedWatchdog {
        debug!("Сторожевой таймер для {} взведён на {:?}", self.record, self.timeout);
        let state = Arc::new(AtomicU8::new(ARMED));
        let task_state = state.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(self.timeout).await;
            if task_state
                .compare_exchange(ARMED, FIRING, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return false;
            }
            self.fire().await
        });

        ArmedWatchdog { task, state }
    }

    /// Снести приложение, если запись всё ещё наша. Возвращает true, если снос был
    async fn fire(&self) -> bool {
        match self.store.read() {
            Ok(Some(current)) if current.is_same_launch(&self.record) => {}
            Ok(current) => {
                debug!(
                    "Таймер {}: запись сменилась ({:?}), ничего не делаем",
                    self.record, current
                );
                return false;
            }
            Err(e) => {
                debug!("Таймер {}: состояние не читается ({}), ничего не делаем", self.record, e);
                return false;
            }
        }

        info!("Таймаут {:?} истёк, закрываем {}", self.timeout, self.record);
        self.teardown
            .terminate(self.record.pid, self.window_class.as_deref())
            .await;

        if let Err(e) = self.store.clear_if_owner(&self.record) {
            warn!("Не удалось удалить файл состояния: {}", e);
        }
        true
    }
}

impl ArmedWatchdog {
    /// Снять таймер. Если снос уже начался, дождаться его окончания.
    /// Возвращает true, если таймер успел сработать.
    pub async fn disarm(self) -> bool {
        if self
            .state
            .compare_exchange(ARMED, DISARMED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.task.abort();
            return false;
        }

        match self.task.await {
            Ok(fired) => fired,
            Err(e) => {
                warn!("Задача сторожевого таймера завершилась с ошибкой: {}", e);
                false
            }
        }
    }

    /// Дождаться срабатывания таймера
    #[cfg(test)]
    pub async fn expire(self) -> bool {
        self.task.await.unwrap_or(false)
    }
}
