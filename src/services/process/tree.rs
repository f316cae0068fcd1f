use super::r#trait::ProcessController;
use crate::debug_if_enabled;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// Как завершился процесс
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    AlreadyGone,
    Graceful,
    Forced,
}

/// Снос процесса вместе с потомками: SIGTERM, ожидание, SIGKILL
#[derive(Clone)]
pub struct ProcessReaper {
    controller: Arc<dyn ProcessController>,
    grace_period: Duration,
    poll_interval: Duration,
}

impl ProcessReaper {
    pub fn new(
        controller: Arc<dyn ProcessController>,
        grace_period: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            controller,
            grace_period,
            poll_interval,
        }
    }

    /// Дерево процессов в порядке обхода в ширину, корень первым.
    ///
    /// Явная очередь вместо рекурсии; повторно встреченные pid пропускаются.
    pub async fn collect_tree(&self, root: u32) -> Vec<u32> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([root]);

        while let Some(pid) = queue.pop_front() {
            if !seen.insert(pid) {
                continue;
            }
            order.push(pid);

            match self.controller.children(pid).await {
                Ok(children) => queue.extend(children),
                Err(e) => debug!("Не удалось получить потомков {}: {}", pid, e),
            }
        }

        order
    }

    /// Снести дерево: сначала самые глубокие потомки, корень последним
    pub async fn terminate_tree(&self, root: u32) -> Vec<(u32, Termination)> {
        let tree = self.collect_tree(root).await;
        debug_if_enabled!("Дерево процесса {}: {:?}", root, tree);
        self.terminate_collected(tree).await
    }

    /// Снести заранее собранное дерево (порядок `collect_tree`).
    ///
    /// Нужно, когда корень может умереть раньше потомков: после его смерти
    /// потомки переходят к init и по родителю уже не находятся.
    pub async fn terminate_collected(&self, tree: Vec<u32>) -> Vec<(u32, Termination)> {
        let mut results = Vec::with_capacity(tree.len());
        for pid in tree.into_iter().rev() {
            results.push((pid, self.terminate(pid).await));
        }
        results
    }

    /// Двухфазное завершение одного процесса. Ошибки ОС проглатываются:
    /// отсутствие процесса и есть цель.
    pub async fn terminate(&self, pid: u32) -> Termination {
        if !self.controller.is_alive(pid) {
            return Termination::AlreadyGone;
        }

        if let Err(e) = self.controller.terminate_gracefully(pid) {
            debug!("SIGTERM для {} не доставлен: {}", pid, e);
            if !self.controller.is_alive(pid) {
                return Termination::AlreadyGone;
            }
        }

        let deadline = Instant::now() + self.grace_period;
        while Instant::now() < deadline {
            sleep(self.poll_interval).await;
            if !self.controller.is_alive(pid) {
                debug!("Процесс {} завершился по SIGTERM", pid);
                return Termination::Graceful;
            }
        }

        warn!("Процесс {} не завершился за {:?}, отправляем SIGKILL", pid, self.grace_period);
        if let Err(e) = self.controller.kill(pid) {
            debug!("SIGKILL для {} не доставлен: {}", pid, e);
        }
        Termination::Forced
    }
}
