//! Appends formatted records to a file, opened lazily on the first record.

use crate::error::Error;
use crate::internal;
use crate::runtime::{
    ErrorCode, Handler, HandlerCore, LogRecord, lock_mutex, lock_read, lock_write,
};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

#[derive(Debug)]
pub struct FileHandler {
    core: HandlerCore,
    path: RwLock<Option<PathBuf>>,
    append: AtomicBool,
    file: Mutex<Option<File>>,
}

impl Default for FileHandler {
    fn default() -> Self {
        Self {
            core: HandlerCore::new(),
            path: RwLock::new(None),
            append: AtomicBool::new(true),
            file: Mutex::new(None),
        }
    }
}

impl FileHandler {
    #[must_use]
    pub fn new(file_name: &str, append: bool) -> Self {
        let handler = Self::default();
        handler.set_append(append);
        handler.set_file_name(Some(file_name));
        handler
    }

    #[must_use]
    pub fn file_name(&self) -> Option<PathBuf> {
        lock_read(&self.path).clone()
    }

    /// Expands `~`. The previous file is closed; the new one opens on the next record.
    pub fn set_file_name(&self, file_name: Option<&str>) {
        let path = file_name.map(|name| PathBuf::from(shellexpand::tilde(name).as_ref()));
        internal::trace(
            "FILE",
            &format!("File handler path set to {:?}", path.as_deref()),
        );
        *lock_write(&self.path) = path;
        lock_mutex(&self.file).take();
    }

    #[must_use]
    pub fn append(&self) -> bool {
        self.append.load(Ordering::Acquire)
    }

    pub fn set_append(&self, append: bool) {
        self.append.store(append, Ordering::Release);
    }

    /// Opens the file, creating missing parent directories. Returns the
    /// directory that had to be created, if any.
    fn open(&self) -> Result<(File, Option<PathBuf>), Error> {
        let Some(path) = self.file_name() else {
            return Err(Error::Unsupported("file handler has no file name".to_string()));
        };
        let mut created = None;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
            created = Some(parent.to_path_buf());
        }
        let mut options = OpenOptions::new();
        options.create(true);
        if self.append() {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        Ok((options.open(&path)?, created))
    }
}

impl Handler for FileHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn write(&self, _record: &LogRecord, formatted: &str) -> Result<(), Error> {
        let mut line = self.core.encode(formatted);
        line.push(b'\n');
        let created = {
            let mut slot = lock_mutex(&self.file);
            let mut created = None;
            if slot.is_none() {
                let (file, dir) = self.open()?;
                *slot = Some(file);
                created = dir;
            }
            if let Some(file) = slot.as_mut() {
                file.write_all(&line)?;
            }
            created
        };
        // Unlocked: the diagnostic logger may route back into this handler.
        if let Some(dir) = created {
            internal::debug("FILE", &format!("Created directory: {}", dir.display()));
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        if let Some(file) = lock_mutex(&self.file).as_mut() {
            file.flush()?;
        }
        Ok(())
    }

    fn close(&self) {
        self.core.mark_closed();
        if let Some(mut file) = lock_mutex(&self.file).take()
            && let Err(e) = file.flush()
        {
            self.core
                .report("flush on close failed", Some(&Error::from(e)), ErrorCode::Close);
        }
    }
}
