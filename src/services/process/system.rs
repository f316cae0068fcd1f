use super::r#trait::ProcessController;
use crate::error::Result;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::fs;
use tokio::process::Command;
use tracing::debug;

/// Реальный контроллер: `pgrep` для обхода таблицы процессов, nix для сигналов
pub struct SystemProcessController;

impl SystemProcessController {
    pub fn new() -> Self {
        Self
    }

    async fn pgrep(args: &[&str]) -> Result<Vec<u32>> {
        let output = Command::new("pgrep").args(args).output().await?;

        // pgrep возвращает 1, когда совпадений нет
        if !output.status.success() {
            debug!("pgrep {:?}: совпадений нет (код {:?})", args, output.status.code());
            return Ok(Vec::new());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_pid_list(&stdout))
    }

    fn signal(pid: u32, signal: Signal) -> Result<()> {
        kill(to_nix_pid(pid)?, signal)?;
        debug!("Отправлен {:?} процессу {}", signal, pid);
        Ok(())
    }
}

impl Default for SystemProcessController {
    fn default() -> Self {
        Self::new()
    }
}

fn to_nix_pid(pid: u32) -> Result<Pid> {
    let raw = i32::try_from(pid).map_err(|_| Errno::EINVAL)?;
    if raw <= 0 {
        return Err(Errno::EINVAL.into());
    }
    Ok(Pid::from_raw(raw))
}

fn parse_pid_list(stdout: &str) -> Vec<u32> {
    stdout
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect()
}

/// Состояние процесса из `/proc/<pid>/stat`: первый символ после имени в скобках
fn proc_state(stat: &str) -> Option<char> {
    let after_comm = &stat[stat.rfind(')')? + 1..];
    after_comm.trim_start().chars().next()
}

fn is_zombie(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => proc_state(&stat) == Some('Z'),
        Err(_) => false,
    }
}

#[async_trait::async_trait]
impl ProcessController for SystemProcessController {
    async fn children(&self, pid: u32) -> Result<Vec<u32>> {
        Self::pgrep(&["-P", &pid.to_string()]).await
    }

    async fn pids_by_name(&self, name: &str) -> Result<Vec<u32>> {
        Self::pgrep(&["-x", name]).await
    }

    fn is_alive(&self, pid: u32) -> bool {
        let Ok(nix_pid) = to_nix_pid(pid) else {
            return false;
        };

        match kill(nix_pid, None) {
            Ok(()) => !is_zombie(pid),
            // Процесс есть, но принадлежит другому пользователю
            Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }

    fn terminate_gracefully(&self, pid: u32) -> Result<()> {
        Self::signal(pid, Signal::SIGTERM)
    }

    fn kill(&self, pid: u32) -> Result<()> {
        Self::signal(pid, Signal::SIGKILL)
    }
}
