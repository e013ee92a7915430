pub mod collection;

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fd_lock::RwLock;

use crate::error::AppResult;

pub use collection::ProfileCollection;

pub trait ProfileStore {
    fn load(&self) -> AppResult<ProfileCollection>;
    fn save(&self, collection: &ProfileCollection) -> AppResult<()>;

    /// Loads the collection, applies `change`, and saves only if it succeeded.
    fn transaction<T>(
        &self,
        change: impl FnOnce(&mut ProfileCollection) -> AppResult<T>,
    ) -> AppResult<T>
    where
        Self: Sized,
    {
        let mut collection = self.load()?;
        let value = change(&mut collection)?;
        self.save(&collection)?;
        Ok(value)
    }
}

/// JSON document store. Mutations hold an exclusive lock on a sidecar
/// `.lock` file and replace the document through a temp file and rename.
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn ensure_parent(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn open_lock(&self) -> AppResult<File> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(self.sibling(".lock"))?;
        Ok(file)
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> AppResult<ProfileCollection> {
        if !self.path.exists() {
            return Ok(ProfileCollection::default());
        }

        let raw = fs::read_to_string(&self.path)?;
        let collection = serde_json::from_str(&raw)?;
        Ok(collection)
    }

    fn save(&self, collection: &ProfileCollection) -> AppResult<()> {
        self.ensure_parent()?;

        let payload = serde_json::to_string_pretty(collection)?;
        let temp_path = self.sibling(".tmp");
        fs::write(&temp_path, payload)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(&temp_path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&temp_path, perms)?;
        }

        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }

        Ok(())
    }

    fn transaction<T>(
        &self,
        change: impl FnOnce(&mut ProfileCollection) -> AppResult<T>,
    ) -> AppResult<T>
    where
        Self: Sized,
    {
        let mut lock = RwLock::new(self.open_lock()?);
        let _guard = lock.write()?;

        let mut collection = self.load()?;
        let value = change(&mut collection)?;
        self.save(&collection)?;
        Ok(value)
    }
}
