use super::r#trait::{AppHandle, AppSpawner};
use crate::error::{LauncherError, Result};
use std::os::unix::process::CommandExt;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::info;

/// Запуск через tokio::process в отдельной группе процессов
pub struct TokioSpawner;

impl TokioSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokioSpawner {
    fn default() -> Self {
        Self::new()
    }
}

struct ChildHandle {
    pid: u32,
    child: Child,
}

#[async_trait::async_trait]
impl AppHandle for ChildHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    async fn wait(&mut self) -> Result<Option<i32>> {
        let status = self.child.wait().await?;
        Ok(status.code())
    }
}

impl AppSpawner for TokioSpawner {
    fn spawn(&self, app: &str, argv: &[String]) -> Result<Box<dyn AppHandle>> {
        let Some((program, args)) = argv.split_first() else {
            return Err(LauncherError::InvalidCommand(format!("пустая команда для {}", app)));
        };

        // Своя группа процессов: Ctrl+C в терминале лаунчера не долетает до приложения,
        // снос выполняет сам лаунчер
        let mut command = std::process::Command::new(program);
        command.args(args).stdin(Stdio::null()).process_group(0);

        let child = Command::from(command)
            .kill_on_drop(false)
            .spawn()
            .map_err(|source| LauncherError::Spawn {
                app: app.to_string(),
                source,
            })?;

        let pid = child.id().ok_or_else(|| LauncherError::Spawn {
            app: app.to_string(),
            source: std::io::Error::other("процесс завершился до получения pid"),
        })?;

        info!("Запущен {} (pid {}): {:?}", app, pid, argv);
        Ok(Box::new(ChildHandle { pid, child }))
    }
}
