use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Неизвестное приложение: {0}")]
    UnknownApp(String),

    #[error("Повреждённый файл состояния: {0}")]
    CorruptState(String),

    #[error("Не удалось запустить {app}: {source}")]
    Spawn {
        app: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Некорректная команда запуска: {0}")]
    InvalidCommand(String),

    #[error("Ошибка отправки сигнала: {0}")]
    Signal(#[from] nix::errno::Errno),

    #[error("Ошибка композитора: {0}")]
    Compositor(String),
}

impl LauncherError {
    pub fn corrupt_state<T>(msg: impl Into<String>) -> Result<T> {
        Err(LauncherError::CorruptState(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;

// Удобный макрос для создания ошибок
#[macro_export]
macro_rules! launcher_error {
    (invalid_command, $($arg:tt)*) => {
        $crate::error::LauncherError::InvalidCommand(format!($($arg)*))
    };
    (compositor, $($arg:tt)*) => {
        $crate::error::LauncherError::Compositor(format!($($arg)*))
    };
    (corrupt_state, $($arg:tt)*) => {
        $crate::error::LauncherError::CorruptState(format!($($arg)*))
    };
}
