use crate::prelude::*;

mod json;
mod memory;

pub use json::JsonStore;
pub(crate) use json::{APPOINTMENTS_FILE, USERS_FILE};
pub use memory::MemoryStore;

/// Persistence collaborator of the clinic.
///
/// Indexes never touch storage themselves, the clinic writes every mutation
/// through to the store right after the index change.
#[async_trait::async_trait]
pub trait Store: Debug + Send + Sync {
    /// Prepares the backing storage, called once by `Clinic::init`.
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Loads all stored users.
    async fn load_users(&self) -> Result<Vec<User>>;

    /// Loads all stored appointments.
    async fn load_appointments(&self) -> Result<Vec<Appointment>>;

    /// Persists a new user.
    async fn add_user(&self, user: &User) -> Result<()>;

    /// Replaces the stored record of `old` with `new`.
    async fn update_user(&self, old: &User, new: &User) -> Result<()>;

    /// Persists a new appointment.
    async fn add_appointment(&self, appointment: &Appointment) -> Result<()>;

    /// Replaces the stored record of `old` with `new`, `new` may carry a
    /// different id.
    async fn update_appointment(&self, old: &Appointment, new: &Appointment) -> Result<()>;

    /// Deletes the appointment with the given id.
    async fn delete_appointment(&self, id: u64) -> Result<()>;
}

pub(crate) fn replace_user(users: &mut Vec<User>, old: &User, new: &User) {
    match users.iter_mut().find(|user| user.username == old.username) {
        Some(user) => *user = new.clone(),
        None => {
            warn!("stored user {} not found, appending", old.username);
            users.push(new.clone());
        }
    }
}

pub(crate) fn replace_appointment(
    appointments: &mut Vec<Appointment>,
    old: &Appointment,
    new: &Appointment,
) {
    match appointments.iter_mut().find(|appointment| appointment.id == old.id) {
        Some(appointment) => *appointment = new.clone(),
        None => {
            warn!("stored appointment {} not found, appending", old.id);
            appointments.push(new.clone());
        }
    }
}
