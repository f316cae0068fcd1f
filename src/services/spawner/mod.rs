mod tokio_spawner;
mod r#trait;

pub use self::r#trait::AppSpawner;
#[cfg(test)]
pub use self::r#trait::AppHandle;
pub use self::tokio_spawner::TokioSpawner;
