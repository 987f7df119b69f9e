//! Game result caches keyed by game ID.

use {
    chrono::TimeDelta,
    crate::prelude::*,
};

/// Finished games never change, but the registry may be edited to point at different games, so entries are kept for 6 hours.
pub(crate) const CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] Json(#[from] serde_json::Error),
    #[error(transparent)] Persist(#[from] tempfile::PathPersistError),
    #[error(transparent)] Wheel(#[from] wheel::Error),
    #[cfg(windows)]
    #[error("no cache directory available on this platform")]
    NoCacheDir,
    #[error("cache TTL out of range")]
    TtlRange,
}

#[async_trait]
pub(crate) trait ResultCache: Send + Sync {
    /// Returns the cached results for those of `ids` which are present and unexpired. Missing IDs are simply absent.
    async fn get_all(&self, ids: &HashSet<GameId>) -> Result<HashMap<GameId, GameResult>, Error>;
    async fn put_all(&self, entries: &HashMap<GameId, GameResult>, ttl: Duration) -> Result<(), Error>;
    async fn remove_all(&self, ids: &[GameId]) -> Result<(), Error>;
    async fn clear(&self) -> Result<(), Error>;
}

/// In-process cache, lost on exit.
#[derive(Default)]
pub(crate) struct MemoryCache {
    entries: Mutex<HashMap<GameId, (Instant, GameResult)>>,
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get_all(&self, ids: &HashSet<GameId>) -> Result<HashMap<GameId, GameResult>, Error> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        Ok(ids.iter()
            .filter_map(|id| entries.get(id).filter(|(expires, _)| *expires > now).map(|(_, result)| (id.clone(), result.clone())))
            .collect())
    }

    async fn put_all(&self, new_entries: &HashMap<GameId, GameResult>, ttl: Duration) -> Result<(), Error> {
        let expires = Instant::now() + ttl;
        let mut entries = self.entries.lock().await;
        for (id, result) in new_entries {
            entries.insert(id.clone(), (expires, result.clone()));
        }
        Ok(())
    }

    async fn remove_all(&self, ids: &[GameId]) -> Result<(), Error> {
        let mut entries = self.entries.lock().await;
        for id in ids {
            entries.remove(id);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

#[derive(Deserialize, Serialize)]
struct FileEntry {
    expires: DateTime<Utc>,
    result: GameResult,
}

/// Cache persisted as a JSON file so entries survive between runs.
///
/// Writes replace the whole file, so concurrent processes can at worst lose each other's entries, causing a refetch.
pub(crate) struct FileCache {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCache {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::default(),
        }
    }

    pub(crate) fn default_path() -> Result<PathBuf, Error> {
        #[cfg(unix)] {
            Ok(xdg::BaseDirectories::with_prefix("chess-bracket").place_cache_file("game-results.json").at_unknown()?)
        }
        #[cfg(windows)] {
            let dirs = directories::ProjectDirs::from("", "", "chess-bracket").ok_or(Error::NoCacheDir)?;
            Ok(dirs.cache_dir().join("game-results.json"))
        }
    }

    /// An unreadable cache file is treated as empty so the next write replaces it.
    async fn load(&self) -> Result<HashMap<GameId, FileEntry>, Error> {
        let buf = match fs::read(&self.path).await {
            Ok(buf) => buf,
            Err(wheel::Error::Io { inner, .. }) if inner.kind() == io::ErrorKind::NotFound => return Ok(HashMap::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&buf) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!("discarding unreadable game result cache at {}: {e} ({e:?})", self.path.display());
                Ok(HashMap::default())
            }
        }
    }

    /// Each write goes to its own temporary file which then replaces the cache file, so concurrent writers never interleave.
    async fn store(&self, mut entries: HashMap<GameId, FileEntry>) -> Result<(), Error> {
        let now = Utc::now();
        entries.retain(|_, entry| entry.expires > now);
        let dir = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()).unwrap_or(Path::new("."));
        fs::create_dir_all(dir).await?;
        let tmp_path = tempfile::NamedTempFile::new_in(dir).at(dir)?.into_temp_path();
        fs::write(&*tmp_path, serde_json::to_vec(&entries)?).await?;
        tmp_path.persist(&self.path)?;
        Ok(())
    }
}

#[async_trait]
impl ResultCache for FileCache {
    async fn get_all(&self, ids: &HashSet<GameId>) -> Result<HashMap<GameId, GameResult>, Error> {
        let _guard = self.lock.lock().await;
        let now = Utc::now();
        let mut entries = self.load().await?;
        Ok(ids.iter()
            .filter_map(|id| entries.remove(id).filter(|entry| entry.expires > now).map(|entry| (id.clone(), entry.result)))
            .collect())
    }

    async fn put_all(&self, new_entries: &HashMap<GameId, GameResult>, ttl: Duration) -> Result<(), Error> {
        if new_entries.is_empty() { return Ok(()) }
        let _guard = self.lock.lock().await;
        let expires = Utc::now() + TimeDelta::from_std(ttl).map_err(|_| Error::TtlRange)?;
        let mut entries = self.load().await?;
        for (id, result) in new_entries {
            entries.insert(id.clone(), FileEntry { expires, result: result.clone() });
        }
        self.store(entries).await
    }

    async fn remove_all(&self, ids: &[GameId]) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        for id in ids {
            entries.remove(id);
        }
        self.store(entries).await
    }

    async fn clear(&self) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(wheel::Error::Io { inner, .. }) if inner.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
