use super::r#trait::Compositor;
use crate::error::Result;
use crate::launcher_error;
use tokio::process::Command;
use tracing::debug;

pub struct SwayCompositor;

impl SwayCompositor {
    pub fn new() -> Self {
        Self
    }

    fn kill_command(class: &str) -> String {
        format!("[app_id=\"^{}$\"] kill", class)
    }
}

#[async_trait::async_trait]
impl Compositor for SwayCompositor {
    fn name(&self) -> &'static str {
        "sway"
    }

    async fn close_class(&self, class: &str) -> Result<()> {
        let command = Self::kill_command(class);
        let output = Command::new("swaymsg")
            .arg(&command)
            .output()
            .await
            .map_err(|e| launcher_error!(compositor, "swaymsg не найден: {}", e))?;

        debug!("swaymsg {}: {:?}", command, output.status.code());

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(launcher_error!(compositor, "swaymsg вернул ошибку: {}", stderr.trim()));
        }

        Ok(())
    }
}
