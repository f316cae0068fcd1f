use crate::services::{Compositor, ProcessReaper};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Снос приложения: закрытие окна через композитор, затем дерево процессов.
///
/// Все ошибки проглатываются, отсутствие процесса считается успехом.
#[derive(Clone)]
pub struct Teardown {
    reaper: ProcessReaper,
    compositor: Arc<dyn Compositor>,
    compositor_timeout: Duration,
}

impl Teardown {
    pub fn new(
        reaper: ProcessReaper,
        compositor: Arc<dyn Compositor>,
        compositor_timeout: Duration,
    ) -> Self {
        Self {
            reaper,
            compositor,
            compositor_timeout,
        }
    }

    pub fn reaper(&self) -> &ProcessReaper {
        &self.reaper
    }

    pub async fn close_window_class(&self, class: &str) {
        match timeout(self.compositor_timeout, self.compositor.close_class(class)).await {
            Ok(Ok(())) => debug!("{}: окна класса {} закрыты", self.compositor.name(), class),
            Ok(Err(e)) => debug!("{}: не удалось закрыть {}: {}", self.compositor.name(), class, e),
            Err(_) => warn!(
                "{}: закрытие {} не уложилось в {:?}",
                self.compositor.name(),
                class,
                self.compositor_timeout
            ),
        }
    }

    /// Дерево собирается до закрытия окна: закрытие может завершить корень,
    /// и его потомки потеряют родителя.
    pub async fn terminate(&self, pid: u32, window_class: Option<&str>) {
        let tree = self.reaper.collect_tree(pid).await;

        if let Some(class) = window_class {
            self.close_window_class(class).await;
        }

        let results = self.reaper.terminate_collected(tree).await;
        debug!("Снос дерева {}: {:?}", pid, results);
    }
}
