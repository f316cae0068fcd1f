use super::r#trait::Compositor;
use crate::error::Result;
use tracing::debug;

/// Без композитора: закрытие окон сводится к сигналам процессам
pub struct NoopCompositor;

#[async_trait::async_trait]
impl Compositor for NoopCompositor {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn close_class(&self, class: &str) -> Result<()> {
        debug!("Композитор не настроен, пропускаем закрытие класса {}", class);
        Ok(())
    }
}
