use super::r#trait::Compositor;
use crate::error::Result;
use crate::launcher_error;
use tokio::process::Command;
use tracing::debug;

pub struct HyprlandCompositor;

impl HyprlandCompositor {
    pub fn new() -> Self {
        Self
    }

    fn window_selector(class: &str) -> String {
        format!("class:^({})$", class)
    }
}

#[async_trait::async_trait]
impl Compositor for HyprlandCompositor {
    fn name(&self) -> &'static str {
        "hyprland"
    }

    async fn close_class(&self, class: &str) -> Result<()> {
        let selector = Self::window_selector(class);
        let output = Command::new("hyprctl")
            .args(["dispatch", "closewindow", selector.as_str()])
            .output()
            .await
            .map_err(|e| launcher_error!(compositor, "hyprctl не найден: {}", e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reply = stdout.trim();
        debug!("hyprctl closewindow {}: '{}'", selector, reply);

        // При ошибке диспетчера hyprctl выходит с кодом 0, но вместо "ok" печатает текст ошибки
        if !output.status.success() || reply != "ok" {
            return Err(launcher_error!(compositor, "hyprctl вернул ошибку: {}", reply));
        }

        Ok(())
    }
}
