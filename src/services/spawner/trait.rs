use crate::error::Result;

/// Handle to a launched application used for the foreground wait
#[async_trait::async_trait]
pub trait AppHandle: Send {
    fn pid(&self) -> u32;

    /// Wait for the process to exit; returns its exit code if it has one
    async fn wait(&mut self) -> Result<Option<i32>>;
}

/// Trait for starting registered applications
pub trait AppSpawner: Send + Sync {
    /// Start `argv` detached from the launcher; `app` is used for errors and logs
    fn spawn(&self, app: &str, argv: &[String]) -> Result<Box<dyn AppHandle>>;
}
