pub mod compositor;
pub mod process;
pub mod spawner;

pub use compositor::{create_compositor, Compositor};
pub use process::{ProcessController, ProcessReaper, SystemProcessController};
pub use spawner::{AppSpawner, TokioSpawner};
