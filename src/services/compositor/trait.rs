use crate::config::CompositorConfig;
use crate::error::Result;
use std::sync::Arc;
use tracing::info;

use super::hyprland::HyprlandCompositor;
use super::noop::NoopCompositor;
use super::sway::SwayCompositor;

/// Trait for compositors that can close windows by class
#[async_trait::async_trait]
pub trait Compositor: Send + Sync {
    /// Human-readable backend name for logs
    fn name(&self) -> &'static str;

    /// Close every window whose class (app_id) matches
    async fn close_class(&self, class: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Hyprland,
    Sway,
    None,
}

fn detect_backend() -> Backend {
    if std::env::var_os("HYPRLAND_INSTANCE_SIGNATURE").is_some() {
        return Backend::Hyprland;
    }

    if std::env::var_os("SWAYSOCK").is_some() {
        return Backend::Sway;
    }

    if let Ok(desktop) = std::env::var("XDG_CURRENT_DESKTOP") {
        match desktop.to_lowercase().as_str() {
            d if d.contains("hyprland") => return Backend::Hyprland,
            d if d.contains("sway") => return Backend::Sway,
            _ => {}
        }
    }

    Backend::None
}

fn backend_from_config(config: &CompositorConfig) -> Backend {
    match config.backend.as_str() {
        "hyprland" => Backend::Hyprland,
        "sway" => Backend::Sway,
        "none" => Backend::None,
        _ => detect_backend(),
    }
}

/// Factory function to create the compositor backend selected in config ("auto" detects it)
pub fn create_compositor(config: &CompositorConfig) -> Arc<dyn Compositor> {
    let compositor: Arc<dyn Compositor> = match backend_from_config(config) {
        Backend::Hyprland => Arc::new(HyprlandCompositor::new()),
        Backend::Sway => Arc::new(SwayCompositor::new()),
        Backend::None => Arc::new(NoopCompositor),
    };

    info!("Композитор: {}", compositor.name());
    compositor
}
