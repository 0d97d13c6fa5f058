use crate::{
    prelude::*,
    record::default_sessions,
    store::{APPOINTMENTS_FILE, USERS_FILE},
};

const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub(crate) struct Config {
    work_dir: Option<PathBuf>,
    create_work_dir: bool,
    users_file: String,
    appointments_file: String,
    sessions: Vec<SessionSlot>,
    search_timeout: Duration,
}

// Getters
impl Config {
    #[inline]
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_ref().map(AsRef::as_ref)
    }

    #[inline]
    pub const fn create_work_dir(&self) -> bool {
        self.create_work_dir
    }

    #[inline]
    pub fn users_file(&self) -> &str {
        &self.users_file
    }

    #[inline]
    pub fn appointments_file(&self) -> &str {
        &self.appointments_file
    }

    #[inline]
    pub fn sessions(&self) -> &[SessionSlot] {
        &self.sessions
    }

    #[inline]
    pub const fn search_timeout(&self) -> Duration {
        self.search_timeout
    }
}

//Setters
impl Config {
    pub fn set_work_dir(&mut self, path: PathBuf) {
        self.work_dir = Some(path);
    }

    pub fn set_create_work_dir(&mut self, create: bool) {
        self.create_work_dir = create;
    }

    pub fn set_users_file(&mut self, name: String) {
        self.users_file = name;
    }

    pub fn set_appointments_file(&mut self, name: String) {
        self.appointments_file = name;
    }

    pub fn set_sessions(&mut self, sessions: Vec<SessionSlot>) {
        self.sessions = sessions;
    }

    pub fn set_search_timeout(&mut self, timeout: Duration) {
        self.search_timeout = timeout;
    }
}

impl Config {
    /// Session numbers must run 1, 2, .. n in catalog order.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.sessions.is_empty() {
            return Err(Error::wrong_config("session catalog is empty"));
        }
        for (slot, expected) in self.sessions.iter().zip(1..) {
            if slot.number != expected {
                return Err(Error::wrong_config(format!(
                    "session {} found where session {} was expected",
                    slot.number, expected
                )));
            }
        }
        Ok(())
    }
}

// Impl Traits
impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: None,
            create_work_dir: true,
            users_file: USERS_FILE.to_owned(),
            appointments_file: APPOINTMENTS_FILE.to_owned(),
            sessions: default_sessions(),
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn misnumbered_catalog_is_rejected() {
        let mut config = Config::default();
        config.set_sessions(vec![SessionSlot::new(1, "09:00", "10:00"), SessionSlot::new(3, "10:00", "11:00")]);
        assert!(matches!(config.validate().unwrap_err().kind(), Kind::WrongConfig(_)));
        config.set_sessions(Vec::new());
        assert!(config.validate().is_err());
    }
}
