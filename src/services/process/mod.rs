//! Управление процессами ОС: опрос таблицы процессов, сигналы, снос дерева.
//!
//! Модуль ничего не знает о файле состояния и реестре приложений; решения о
//! том, кого сносить, принимает только Launcher.

mod system;
mod tree;
mod r#trait;

pub use self::r#trait::ProcessController;
pub use self::system::SystemProcessController;
pub use self::tree::ProcessReaper;
