use crate::error::{LauncherError, Result as LauncherResult};
use crate::launcher_error;
use crate::utils::expand_home;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub state: StateConfig,
    pub timing: TimingConfig,
    pub compositor: CompositorConfig,
    #[serde(default)]
    pub apps: BTreeMap<String, AppSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    pub watchdog_timeout_secs: u64,
    pub grace_period_ms: u64,
    pub poll_interval_ms: u64,
    pub compositor_timeout_ms: u64,
    pub settle_delay_ms: u64,
}

impl TimingConfig {
    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_secs(self.watchdog_timeout_secs)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn compositor_timeout(&self) -> Duration {
        Duration::from_millis(self.compositor_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompositorConfig {
    /// "auto" | "hyprland" | "sway" | "none"
    pub backend: String,
}

/// Описание приложения в реестре
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppSpec {
    pub command: LaunchCommand,
    /// Класс окна в композиторе; если задан, приложение закрывается через композитор
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_class: Option<String>,
    /// Имена процессов, которые добиваются перед запуском
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sweep_names: Vec<String>,
}

impl AppSpec {
    fn shell(command: &str) -> Self {
        Self {
            command: LaunchCommand::Shell(command.to_string()),
            window_class: None,
            sweep_names: Vec::new(),
        }
    }

    fn argv(args: &[&str]) -> Self {
        Self {
            command: LaunchCommand::Argv(args.iter().map(|s| s.to_string()).collect()),
            window_class: None,
            sweep_names: Vec::new(),
        }
    }

    fn with_window_class(mut self, class: &str) -> Self {
        self.window_class = Some(class.to_string());
        self
    }

    fn with_sweep(mut self, name: &str) -> Self {
        self.sweep_names.push(name.to_string());
        self
    }

    pub fn is_compositor_managed(&self) -> bool {
        self.window_class.is_some()
    }
}

/// Команда запуска: строка в стиле shell или готовый вектор аргументов
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LaunchCommand {
    Shell(String),
    Argv(Vec<String>),
}

impl LaunchCommand {
    /// Превращает команду в вектор аргументов.
    ///
    /// Строка разбирается по правилам кавычек shell, ведущий `~/` каждого токена
    /// раскрывается. Вектор передаётся как есть.
    pub fn resolve(&self) -> LauncherResult<Vec<String>> {
        let argv = match self {
            LaunchCommand::Shell(line) => shlex::split(line)
                .ok_or_else(|| launcher_error!(invalid_command, "незакрытые кавычки в '{}'", line))?
                .iter()
                .map(|token| expand_home(token))
                .collect::<Vec<_>>(),
            LaunchCommand::Argv(args) => args.clone(),
        };

        if argv.is_empty() || argv[0].is_empty() {
            return Err(LauncherError::InvalidCommand("пустая команда".to_string()));
        }

        Ok(argv)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut apps = BTreeMap::new();
        apps.insert(
            "rofi".to_string(),
            AppSpec::shell("~/.config/rofi/scripts/launcher.sh").with_sweep("rofi"),
        );
        apps.insert(
            "rofi-powermenu".to_string(),
            AppSpec::shell("~/.config/rofi/scripts/powermenu.sh"),
        );
        apps.insert(
            "rofi-screenshot".to_string(),
            AppSpec::shell("~/.config/rofi/scripts/screenshot.sh"),
        );
        apps.insert(
            "clipse".to_string(),
            AppSpec::argv(&["kitty", "--class", "clipse", "-e", "clipse"]).with_window_class("clipse"),
        );
        apps.insert(
            "floating-selector".to_string(),
            AppSpec::argv(&[
                "kitty",
                "--class=floating-selector",
                "-e",
                "bash",
                "-c",
                "~/.local/bin/quick-edit",
            ])
            .with_window_class("floating-selector"),
        );
        apps.insert(
            "waypaper".to_string(),
            AppSpec::shell("waypaper")
                .with_window_class("waypaper")
                .with_sweep("waypaper"),
        );

        Self {
            logging: LoggingConfig {
                level: "warn".to_string(),
            },
            state: StateConfig {
                path: PathBuf::from("/tmp/ui-launcher-state"),
            },
            timing: TimingConfig {
                watchdog_timeout_secs: 45,
                grace_period_ms: 500,
                poll_interval_ms: 50,
                compositor_timeout_ms: 1000,
                settle_delay_ms: 200,
            },
            compositor: CompositorConfig {
                backend: "auto".to_string(),
            },
            apps,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("UI_LAUNCHER_").split("__"));

        Self::from_figment(figment)
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn app(&self, name: &str) -> Option<&AppSpec> {
        self.apps.get(name)
    }

    pub fn app_names(&self) -> Vec<&str> {
        self.apps.keys().map(String::as_str).collect()
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        if self.state.path.file_name().is_none() {
            anyhow::bail!("Некорректный путь файла состояния: {:?}", self.state.path);
        }

        if self.timing.watchdog_timeout_secs == 0 {
            anyhow::bail!("watchdog_timeout_secs должно быть больше 0");
        }

        if self.timing.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms должно быть больше 0");
        }

        if self.timing.poll_interval_ms > self.timing.grace_period_ms {
            anyhow::bail!("poll_interval_ms не может превышать grace_period_ms");
        }

        match self.compositor.backend.as_str() {
            "auto" | "hyprland" | "sway" | "none" => {}
            _ => anyhow::bail!("Неизвестный бэкенд композитора: {}", self.compositor.backend),
        }

        if self.apps.is_empty() {
            anyhow::bail!("Реестр приложений пуст");
        }

        for (name, spec) in &self.apps {
            if name.is_empty() || name.contains(',') || name.chars().any(char::is_whitespace) {
                anyhow::bail!("Недопустимое имя приложения: '{}'", name);
            }

            if let Err(e) = spec.command.resolve() {
                anyhow::bail!("Приложение '{}': {}", name, e);
            }

            if matches!(&spec.window_class, Some(class) if class.is_empty()) {
                anyhow::bail!("Приложение '{}': пустой window_class", name);
            }
        }

        Ok(())
    }
}
