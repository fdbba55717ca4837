//! Key-value storage backends
//!
//! Native builds keep one JSON file per key under the XDG config directory;
//! the browser build uses LocalStorage.

#[cfg(not(target_arch = "wasm32"))]
pub use native::{FileStore, config_dir};
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use crate::persistence::{KeyValueStore, StoreError};

    const APP_DIR: &str = "stack-tower";

    /// Directory for saved data ($XDG_CONFIG_HOME or ~/.config, then stack-tower)
    pub fn config_dir() -> PathBuf {
        let base = match std::env::var("XDG_CONFIG_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
            _ => std::env::var("HOME")
                .map(|h| PathBuf::from(h).join(".config"))
                .unwrap_or_else(|_| PathBuf::from(".")),
        };
        base.join(APP_DIR)
    }

    /// One file per key in a directory
    #[derive(Debug, Clone)]
    pub struct FileStore {
        dir: PathBuf,
    }

    impl FileStore {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        /// Store under the user's config directory
        pub fn open_default() -> Self {
            Self::new(config_dir())
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        fn path_for(&self, key: &str) -> PathBuf {
            self.dir.join(format!("{key}.json"))
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            match fs::read_to_string(self.path_for(key)) {
                Ok(contents) => Ok(Some(contents)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            fs::create_dir_all(&self.dir)?;
            let path = self.path_for(key);
            // Write then rename so a crash never leaves a torn file
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, value)?;
            fs::rename(&tmp, &path)?;
            Ok(())
        }
    }

}

#[cfg(target_arch = "wasm32")]
mod web {
    use crate::persistence::{KeyValueStore, StoreError};

    /// Browser LocalStorage
    pub struct LocalStorage {
        storage: web_sys::Storage,
    }

    impl LocalStorage {
        pub fn open() -> Result<Self, StoreError> {
            let storage = web_sys::window()
                .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?
                .local_storage()
                .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
                .ok_or_else(|| StoreError::Unavailable("localStorage disabled".to_string()))?;
            Ok(Self { storage })
        }
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.storage
                .get_item(key)
                .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.storage
                .set_item(key, value)
                .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
        }
    }
}
