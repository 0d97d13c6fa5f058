use super::{replace_appointment, replace_user, Store};
use crate::prelude::*;

#[derive(Debug, Default)]
struct Records {
    users: Vec<User>,
    appointments: Vec<Appointment>,
}

/// Keeps records in memory. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Records>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with records.
    #[must_use]
    pub fn with_records(users: Vec<User>, appointments: Vec<Appointment>) -> Self {
        Self {
            records: Arc::new(Mutex::new(Records {
                users,
                appointments,
            })),
        }
    }

    /// Stored users.
    pub async fn users(&self) -> Vec<User> {
        self.records.lock().await.users.clone()
    }

    /// Stored appointments.
    pub async fn appointments(&self) -> Vec<Appointment> {
        self.records.lock().await.appointments.clone()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn load_users(&self) -> Result<Vec<User>> {
        Ok(self.users().await)
    }

    async fn load_appointments(&self) -> Result<Vec<Appointment>> {
        Ok(self.appointments().await)
    }

    async fn add_user(&self, user: &User) -> Result<()> {
        self.records.lock().await.users.push(user.clone());
        Ok(())
    }

    async fn update_user(&self, old: &User, new: &User) -> Result<()> {
        replace_user(&mut self.records.lock().await.users, old, new);
        Ok(())
    }

    async fn add_appointment(&self, appointment: &Appointment) -> Result<()> {
        self.records
            .lock()
            .await
            .appointments
            .push(appointment.clone());
        Ok(())
    }

    async fn update_appointment(&self, old: &Appointment, new: &Appointment) -> Result<()> {
        replace_appointment(&mut self.records.lock().await.appointments, old, new);
        Ok(())
    }

    async fn delete_appointment(&self, id: u64) -> Result<()> {
        self.records
            .lock()
            .await
            .appointments
            .retain(|appointment| appointment.id != id);
        Ok(())
    }
}
