use crate::error::{LauncherError, Result};
use std::fmt;
use std::str::FromStr;

/// Запись о текущем владельце: `pid,app_name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackedRecord {
    pub pid: u32,
    pub app_name: String,
}

impl TrackedRecord {
    pub fn new(pid: u32, app_name: impl Into<String>) -> Self {
        Self {
            pid,
            app_name: app_name.into(),
        }
    }

    pub fn is_same_launch(&self, other: &TrackedRecord) -> bool {
        self.pid == other.pid && self.app_name == other.app_name
    }
}

impl fmt::Display for TrackedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.pid, self.app_name)
    }
}

impl FromStr for TrackedRecord {
    type Err = LauncherError;

    fn from_str(raw: &str) -> Result<Self> {
        let data = raw.trim();

        let Some((pid, app_name)) = data.split_once(',') else {
            return LauncherError::corrupt_state(format!("нет разделителя в '{}'", data));
        };

        let pid: u32 = pid
            .parse()
            .map_err(|_| LauncherError::CorruptState(format!("некорректный pid '{}'", pid)))?;

        if pid == 0 {
            return LauncherError::corrupt_state("pid равен 0");
        }

        if app_name.is_empty() || app_name.contains(',') {
            return LauncherError::corrupt_state(format!("некорректное имя '{}'", app_name));
        }

        Ok(Self::new(pid, app_name))
    }
}
