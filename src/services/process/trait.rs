use crate::error::Result;

/// Возможности ОС по управлению процессами, нужные лаунчеру
#[async_trait::async_trait]
pub trait ProcessController: Send + Sync {
    /// Прямые потомки процесса (один уровень)
    async fn children(&self, pid: u32) -> Result<Vec<u32>>;

    /// Процессы с точно совпадающим именем
    async fn pids_by_name(&self, name: &str) -> Result<Vec<u32>>;

    /// Жив ли процесс (зомби считается мёртвым)
    fn is_alive(&self, pid: u32) -> bool;

    /// SIGTERM
    fn terminate_gracefully(&self, pid: u32) -> Result<()>;

    /// SIGKILL
    fn kill(&self, pid: u32) -> Result<()>;
}
