use super::{replace_appointment, replace_user, Store};
use crate::prelude::*;
use serde::de::DeserializeOwned;
use std::io::ErrorKind as IOErrorKind;
use tokio::fs;

pub(crate) const USERS_FILE: &str = "users.json";
pub(crate) const APPOINTMENTS_FILE: &str = "appointments.json";

/// Keeps users and appointments as pretty-printed JSON arrays in two files
/// of a work dir.
///
/// Every mutation reads the whole file, modifies it and writes it back while
/// holding an async mutex. A missing file loads as an empty list.
#[derive(Debug)]
pub struct JsonStore {
    work_dir: PathBuf,
    users_path: PathBuf,
    appointments_path: PathBuf,
    create_work_dir: bool,
    lock: Mutex<()>,
}

impl JsonStore {
    /// Store over `users.json` and `appointments.json` in `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self::with_file_names(work_dir, USERS_FILE, APPOINTMENTS_FILE)
    }

    /// Store with custom file names inside `work_dir`.
    pub fn with_file_names(
        work_dir: impl Into<PathBuf>,
        users_file: impl AsRef<Path>,
        appointments_file: impl AsRef<Path>,
    ) -> Self {
        let work_dir = work_dir.into();
        Self {
            users_path: work_dir.join(users_file),
            appointments_path: work_dir.join(appointments_file),
            work_dir,
            create_work_dir: true,
            lock: Mutex::new(()),
        }
    }

    /// Whether a missing work dir is created by `init`.
    #[must_use]
    pub fn create_work_dir(mut self, create: bool) -> Self {
        self.create_work_dir = create;
        self
    }

    /// Path of the users file.
    #[must_use]
    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    /// Path of the appointments file.
    #[must_use]
    pub fn appointments_path(&self) -> &Path {
        &self.appointments_path
    }

    async fn prepare_work_dir(&self) -> AnyResult<()> {
        let path = self.work_dir.as_path();
        if path.exists() {
            debug!("work dir exists: {}", path.display());
        } else if self.create_work_dir {
            debug!("creating work dir recursively: {}", path.display());
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("failed to create work dir: {}", path.display()))?;
        } else {
            error!("work dir path not found: {}", path.display());
            return Err(Error::from(Kind::WrongConfig(format!(
                "work dir path not found: {}",
                path.display()
            ))))
            .context("failed to prepare work dir");
        }
        Ok(())
    }

    async fn modify<T, F>(&self, path: &Path, f: F) -> Result<()>
    where
        T: DeserializeOwned + serde::Serialize,
        F: FnOnce(&mut Vec<T>),
    {
        let _guard = self.lock.lock().await;
        let mut items = read_list(path).await.map_err(Error::store)?;
        f(&mut items);
        write_list(path, &items).await.map_err(Error::store)
    }
}

async fn read_list<T: DeserializeOwned>(path: &Path) -> AnyResult<Vec<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == IOErrorKind::NotFound => {
            debug!("{} not found, starting empty", path.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&bytes).with_context(|| format!("failed to parse {}", path.display()))
}

async fn write_list<T: serde::Serialize>(path: &Path, items: &[T]) -> AnyResult<()> {
    let bytes = serde_json::to_vec_pretty(items)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    trace!("{} records written to {}", items.len(), path.display());
    Ok(())
}

#[async_trait::async_trait]
impl Store for JsonStore {
    async fn init(&self) -> Result<()> {
        self.prepare_work_dir().await.map_err(Error::store)
    }

    async fn load_users(&self) -> Result<Vec<User>> {
        let _guard = self.lock.lock().await;
        read_list(&self.users_path).await.map_err(Error::store)
    }

    async fn load_appointments(&self) -> Result<Vec<Appointment>> {
        let _guard = self.lock.lock().await;
        read_list(&self.appointments_path).await.map_err(Error::store)
    }

    async fn add_user(&self, user: &User) -> Result<()> {
        self.modify(&self.users_path, |users: &mut Vec<User>| users.push(user.clone()))
            .await
    }

    async fn update_user(&self, old: &User, new: &User) -> Result<()> {
        self.modify(&self.users_path, |users| replace_user(users, old, new))
            .await
    }

    async fn add_appointment(&self, appointment: &Appointment) -> Result<()> {
        self.modify(&self.appointments_path, |appointments: &mut Vec<Appointment>| {
            appointments.push(appointment.clone())
        })
        .await
    }

    async fn update_appointment(&self, old: &Appointment, new: &Appointment) -> Result<()> {
        self.modify(&self.appointments_path, |appointments| {
            replace_appointment(appointments, old, new)
        })
        .await
    }

    async fn delete_appointment(&self, id: u64) -> Result<()> {
        self.modify(&self.appointments_path, |appointments: &mut Vec<Appointment>| {
            appointments.retain(|appointment| appointment.id != id)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    #[tokio::test]
    async fn missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested"));
        store.init().await.unwrap();
        assert!(store.load_users().await.unwrap().is_empty());
        assert!(store.load_appointments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_work_dir_is_not_created_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("absent")).create_work_dir(false);
        assert!(matches!(store.init().await.unwrap_err().kind(), Kind::Store(_)));
    }

    #[tokio::test]
    async fn appointments_written_through() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let first = Appointment::new(1, "amy01", "drlee", date("2024-04-01"), 1);
        let second = Appointment::new(2, "bob01", "drlee", date("2024-04-01"), 2);
        store.add_appointment(&first).await.unwrap();
        store.add_appointment(&second).await.unwrap();
        let moved = Appointment::new(3, "amy01", "drlee", date("2024-04-05"), 1);
        store.update_appointment(&first, &moved).await.unwrap();
        store.delete_appointment(2).await.unwrap();
        assert_eq!(store.load_appointments().await.unwrap(), vec![moved]);

        let raw = std::fs::read_to_string(store.appointments_path()).unwrap();
        assert!(raw.contains("\"date\": \"2024-04-05\""));
    }

    #[tokio::test]
    async fn users_written_through() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::with_file_names(dir.path(), "people.json", "bookings.json");
        let amy = User::new("amy01", "hash", Role::Patient, "Amy", "Tan");
        store.add_user(&amy).await.unwrap();
        let mut deleted = amy.clone();
        deleted.is_deleted = true;
        store.update_user(&amy, &deleted).await.unwrap();
        assert_eq!(store.load_users().await.unwrap(), vec![deleted]);
        assert!(dir.path().join("people.json").exists());
    }

    #[tokio::test]
    async fn corrupted_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        std::fs::write(store.users_path(), "[{").unwrap();
        let err = store.load_users().await.unwrap_err();
        assert!(matches!(err.kind(), Kind::Store(_)));
    }
}
