use anyhow::Result;
use clap::Parser;
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};
mod config;
mod error;
mod launcher;
mod services;
mod state;
mod utils;

#[cfg(test)]
mod testing;

use config::Config;
use launcher::{usage_message, Launcher, Outcome};
use services::{create_compositor, SystemProcessController, TokioSpawner};
use state::FileStateStore;

#[derive(Parser, Debug)]
#[command(name = "ui-launcher")]
#[command(about = "Эксклюзивный запуск UI-помощников: один открыт, повторный вызов закрывает")]
struct Args {
    /// Имя приложения из реестра
    app: Option<String>,

    /// Путь к файлу конфигурации
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Показать зарегистрированные приложения
    #[arg(long)]
    list: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,
}

/// Код выхода при неверном или отсутствующем имени приложения
const EXIT_USAGE: u8 = 1;

/// Имя приложения из аргументов либо текст подсказки, если имя не из реестра
fn select_app(app: Option<String>, config: &Config) -> std::result::Result<String, String> {
    match app {
        Some(app) if config.app(&app).is_some() => Ok(app),
        _ => Err(usage_message(env!("CARGO_PKG_NAME"), config)),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config_path = args.config.clone().unwrap_or_else(utils::default_config_path);
    let config = Arc::new(Config::load(&config_path)?);

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level)?;

    info!("Запуск ui-launcher v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация: {:?}", config_path);

    if args.list {
        for name in config.app_names() {
            println!("{}", name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Неверное имя: подсказка и выход, состояние не трогаем
    let app = match select_app(args.app, &config) {
        Ok(app) => app,
        Err(usage) => {
            println!("{}", usage);
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };

    let store = Arc::new(FileStateStore::new(&config.state.path));
    info!("Файл состояния: {:?}", store.path());

    let launcher = Launcher::new(
        config.clone(),
        store,
        Arc::new(SystemProcessController::new()),
        create_compositor(&config.compositor),
        Arc::new(TokioSpawner::new()),
    );

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
        let action = launcher.dry_run(&app)?;
        info!("Dry-run: {:?}", action);
        return Ok(ExitCode::SUCCESS);
    }

    // Обработчик ставится до запуска, чтобы Ctrl+C не убил лаунчер раньше времени
    let interrupt = interrupt_listener();

    match launcher.run(&app, interrupt).await {
        Ok(Outcome::ToggledOff(record)) => info!("{} закрыт повторным вызовом", record),
        Ok(Outcome::Exited { record, code }) => info!("{} завершился с кодом {:?}", record, code),
        Ok(Outcome::Interrupted(record)) => info!("Получен Ctrl+C, {} закрыт", record),
        Err(e) => {
            error!("Не удалось запустить {}: {}", app, e);
            return Err(e.into());
        }
    }

    info!("ui-launcher завершил работу");
    Ok(ExitCode::SUCCESS)
}

/// Зарегистрировать обработчик SIGINT сразу; future завершается по Ctrl+C
fn interrupt_listener() -> impl Future<Output = ()> + Send {
    let registered = signal(SignalKind::interrupt());

    async move {
        match registered {
            Ok(mut sigint) => {
                sigint.recv().await;
            }
            Err(err) => {
                error!("Не удалось установить обработчик Ctrl+C: {}", err);
                // Без обработчика ждём только завершения приложения
                std::future::pending::<()>().await;
            }
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    Ok(())
}
