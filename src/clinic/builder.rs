use super::{Clinic, Config};
use crate::{
    prelude::*,
    store::{JsonStore, MemoryStore, Store},
};

/// `Builder` used for initializing a `Clinic`.
///
/// # Examples
/// ```no_run
/// use molar::Builder;
/// use std::time::Duration;
///
/// let clinic = Builder::new()
///     .work_dir("/tmp/molar/")
///     .search_timeout(Duration::from_secs(1))
///     .build()
///     .unwrap();
/// ```
#[derive(Default, Debug)]
pub struct Builder {
    config: Config,
    store: Option<Arc<dyn Store>>,
}

impl Builder {
    /// Initializes the `Builder` with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `Clinic` based on given configuration.
    ///
    /// Without a custom store and a work dir, records are kept in memory
    /// only.
    /// # Errors
    /// Fails with `ErrorKind::WrongConfig` if the session catalog is empty or
    /// not numbered 1..n.
    pub fn build(self) -> Result<Clinic> {
        self.config.validate()?;
        let store: Arc<dyn Store> = match (self.store, self.config.work_dir()) {
            (Some(store), _) => store,
            (None, Some(work_dir)) => Arc::new(
                JsonStore::with_file_names(
                    work_dir,
                    self.config.users_file(),
                    self.config.appointments_file(),
                )
                .create_work_dir(self.config.create_work_dir()),
            ),
            (None, None) => {
                info!("work dir not set, records are kept in memory");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(Clinic::new(self.config, store))
    }

    /// # Description
    /// Sets the directory holding the users and appointments files.
    /// If path not exists, clinic will try to create it at initialization
    /// stage.
    /// # Examples
    /// ```no_run
    /// let builder = molar::Builder::new().work_dir("/tmp/molar/");
    /// ```
    #[must_use]
    pub fn work_dir<S: Into<PathBuf>>(mut self, work_dir: S) -> Self {
        let path: PathBuf = work_dir.into();
        info!("work dir set to: {}", path.display());
        self.config.set_work_dir(path);
        self
    }

    /// Whether a missing work dir is created on `init`, `true` by default.
    #[must_use]
    pub fn create_work_dir(mut self, create: bool) -> Self {
        info!("create work dir: {}", create);
        self.config.set_create_work_dir(create);
        self
    }

    /// Users file name inside the work dir.
    /// Must not be empty.
    #[must_use]
    pub fn users_file<S: Into<String>>(mut self, name: S) -> Self {
        let name = name.into();
        if name.is_empty() {
            error!("passed empty users file name, not set");
        } else {
            info!("users file set to: {}", name);
            self.config.set_users_file(name);
        }
        self
    }

    /// Appointments file name inside the work dir.
    /// Must not be empty.
    #[must_use]
    pub fn appointments_file<S: Into<String>>(mut self, name: S) -> Self {
        let name = name.into();
        if name.is_empty() {
            error!("passed empty appointments file name, not set");
        } else {
            info!("appointments file set to: {}", name);
            self.config.set_appointments_file(name);
        }
        self
    }

    /// Daily session catalog, numbered from 1 in order.
    #[must_use]
    pub fn sessions(mut self, sessions: Vec<SessionSlot>) -> Self {
        info!("session catalog set, {} slots", sessions.len());
        self.config.set_sessions(sessions);
        self
    }

    /// # Description
    /// Sets how long the conjunctive search waits for each predicate task.
    /// Must be greater than zero
    #[must_use]
    pub fn search_timeout(mut self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            error!("zero search timeout fails every search, not set");
        } else {
            info!("search timeout set to: {:?}", timeout);
            self.config.set_search_timeout(timeout);
        }
        self
    }

    /// Custom persistence collaborator, takes precedence over the work dir.
    #[must_use]
    pub fn store(mut self, store: impl Store + 'static) -> Self {
        info!("custom store set: {:?}", store);
        self.store = Some(Arc::new(store));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_values_keep_defaults() {
        let builder = Builder::new()
            .search_timeout(Duration::ZERO)
            .users_file("")
            .appointments_file("");
        assert_eq!(builder.config.search_timeout(), Duration::from_secs(5));
        assert_eq!(builder.config.users_file(), "users.json");
        assert_eq!(builder.config.appointments_file(), "appointments.json");
    }

    #[test]
    fn bad_catalog_fails_build() {
        let err = Builder::new().sessions(Vec::new()).build().unwrap_err();
        assert!(matches!(err.kind(), Kind::WrongConfig(_)));
    }
}
