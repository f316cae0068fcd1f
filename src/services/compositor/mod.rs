//! Закрытие окон средствами композитора (Hyprland, Sway).
//!
//! Вызовы best-effort: Launcher ограничивает их таймаутом и игнорирует ошибки.

mod hyprland;
mod noop;
mod sway;
mod r#trait;

pub use self::r#trait::{create_compositor, Compositor};
