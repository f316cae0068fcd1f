use super::TrackedRecord;
use crate::error::Result;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Хранилище единственной записи о владельце.
///
/// Вся логика лаунчера работает через этот трейт, а не с файлом напрямую.
pub trait StateStore: Send + Sync {
    /// Прочитать запись. `Err(CorruptState)` если содержимое не разбирается
    fn read(&self) -> Result<Option<TrackedRecord>>;

    /// Атомарно заменить запись: читатель видит либо старую, либо новую целиком
    fn commit_atomic(&self, record: &TrackedRecord) -> Result<()>;

    /// Удалить запись; отсутствие записи не ошибка
    fn clear(&self) -> Result<()>;

    /// Удалить запись, только если она всё ещё указывает на этот запуск
    fn clear_if_owner(&self, record: &TrackedRecord) -> Result<bool> {
        match self.read()? {
            Some(current) if current.is_same_launch(record) => {
                self.clear()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Файловое хранилище: `pid,app_name` в одном текстовом файле
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl StateStore for FileStateStore {
    fn read(&self) -> Result<Option<TrackedRecord>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        data.parse().map(Some)
    }

    fn commit_atomic(&self, record: &TrackedRecord) -> Result<()> {
        // Временный файл в том же каталоге, чтобы rename не пересекал ФС
        fs::create_dir_all(self.parent_dir())?;
        let mut tmp = NamedTempFile::new_in(self.parent_dir())?;
        tmp.write_all(record.to_string().as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!("Состояние записано в {:?}: {}", self.path, record);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Файл состояния {:?} удалён", self.path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Хранилище в памяти для тестов
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStateStore {
    raw: parking_lot::Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: &str) -> Self {
        let store = Self::new();
        store.set_raw(raw);
        store
    }

    pub fn set_raw(&self, raw: &str) {
        *self.raw.lock() = Some(raw.to_string());
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.lock().clone()
    }
}

#[cfg(test)]
impl StateStore for MemoryStateStore {
    fn read(&self) -> Result<Option<TrackedRecord>> {
        match self.raw.lock().as_deref() {
            Some(raw) => raw.parse().map(Some),
            None => Ok(None),
        }
    }

    fn commit_atomic(&self, record: &TrackedRecord) -> Result<()> {
        *self.raw.lock() = Some(record.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.raw.lock() = None;
        Ok(())
    }
}
