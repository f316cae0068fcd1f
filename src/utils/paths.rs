use directories::BaseDirs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "ui-launcher";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Путь к конфигурации по умолчанию: `$XDG_CONFIG_HOME/ui-launcher/config.toml`
pub fn default_config_path() -> PathBuf {
    match BaseDirs::new() {
        Some(dirs) => dirs.config_dir().join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME),
        None => PathBuf::from(CONFIG_FILE_NAME),
    }
}

/// Раскрывает ведущий `~` в домашний каталог пользователя
pub fn expand_home(token: &str) -> String {
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    expand_home_with(token, home.as_deref())
}

fn expand_home_with(token: &str, home: Option<&Path>) -> String {
    let Some(home) = home else {
        return token.to_string();
    };

    if token == "~" {
        return home.to_string_lossy().into_owned();
    }

    match token.strip_prefix("~/") {
        Some(rest) => home.join(rest).to_string_lossy().into_owned(),
        None => token.to_string(),
    }
}
