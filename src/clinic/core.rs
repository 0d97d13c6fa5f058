use super::Config;
use crate::{
    appointment_index::AppointmentIndex,
    prelude::*,
    search::{ConjunctiveSearch, SearchQuery},
    store::Store,
    user_index::UserIndex,
    validation::validate_user,
};
use std::collections::HashSet;

/// Shared clinic state: the user and appointment indexes, the session
/// catalog and the persistence collaborator.
///
/// This type is clonable, cloning it will only create a new reference,
/// not a new clinic.
///
/// Locks are always taken users first, appointments second. Every mutation
/// is written to the store while the index lock is held, a failed store
/// write leaves the index unchanged.
///
/// # Examples
///
/// ```no_run
/// use molar::{Builder, Date};
///
/// #[tokio::main]
/// async fn main() {
///     let clinic = Builder::new().work_dir("/tmp/molar/").build().unwrap();
///     clinic.init().await.unwrap();
///     let day = Date::parse("2024-04-01").unwrap();
///     for slot in clinic.availability("drlee", &day).await.unwrap() {
///         println!("{} {}-{} {}", slot.slot.number, slot.slot.start, slot.slot.end, slot.available);
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Clinic {
    config: Arc<Config>,
    users: Arc<RwLock<UserIndex>>,
    appointments: Arc<RwLock<AppointmentIndex>>,
    store: Arc<dyn Store>,
    search: ConjunctiveSearch,
    next_appointment_id: Arc<AtomicU64>,
    initialized: Arc<AtomicBool>,
}

impl Clinic {
    pub(crate) fn new(config: Config, store: Arc<dyn Store>) -> Self {
        let search = ConjunctiveSearch::new(config.search_timeout());
        Self {
            config: Arc::new(config),
            users: Arc::default(),
            appointments: Arc::default(),
            store,
            search,
            next_appointment_id: Arc::new(AtomicU64::new(1)),
            initialized: Arc::default(),
        }
    }

    /// [`init()`] loads all records from the store into the indexes.
    ///
    /// Users are appended in bulk and sorted once. Appointments referring
    /// to unknown users and records with a duplicated key are skipped with
    /// a warning. Calling `init` again is a no-op. A failed `init` leaves
    /// the indexes empty and can be retried.
    /// # Errors
    /// Returns error if the store can't be prepared or read.
    ///
    /// [`init()`]: Clinic::init
    pub async fn init(&self) -> Result<()> {
        let mut users = self.users.write().await;
        let mut appointments = self.appointments.write().await;
        if self.initialized.load(ORD) {
            warn!("clinic already initialized");
            return Ok(());
        }
        self.store.init().await?;
        let (loaded_users, loaded_appointments, next_id) = self.load().await?;
        *users = loaded_users;
        *appointments = loaded_appointments;
        self.next_appointment_id.store(next_id, ORD);
        self.initialized.store(true, ORD);
        info!(
            "clinic initialized: {} users, {} appointments, tree height {}",
            users.len(),
            appointments.len(),
            appointments.height()
        );
        Ok(())
    }

    // Builds fresh indexes from the store, the shared ones stay untouched
    // until every record is loaded.
    async fn load(&self) -> Result<(UserIndex, AppointmentIndex, u64)> {
        let mut users = UserIndex::default();
        let mut usernames = HashSet::new();
        for user in self.store.load_users().await? {
            if usernames.insert(user.username.clone()) {
                users.add(user);
            } else {
                warn!("duplicate user {} skipped", user.username);
            }
        }
        users.insertion_sort();
        trace!("{} users loaded", users.len());

        let mut appointments = AppointmentIndex::default();
        let mut ids = HashSet::new();
        let mut max_id = 0;
        for appointment in self.store.load_appointments().await? {
            let known = users.find_by_username(&appointment.dentist)?.is_some()
                && users.find_by_username(&appointment.patient)?.is_some();
            if !known {
                warn!("{} refers to an unknown user, skipped", appointment);
            } else if !ids.insert(appointment.id) {
                warn!("duplicate appointment id {}, skipped", appointment.id);
            } else {
                max_id = max_id.max(appointment.id);
                appointments.add(appointment);
            }
        }
        trace!("{} appointments loaded", appointments.len());
        Ok((users, appointments, max_id + 1))
    }

    fn check_initialized(&self) -> Result<()> {
        if self.initialized.load(ORD) {
            Ok(())
        } else {
            error!("clinic used before init");
            Err(Kind::Uninitialized.into())
        }
    }

    fn check_session(&self, session: u32) -> Result<()> {
        if self.config.sessions().iter().any(|slot| slot.number == session) {
            Ok(())
        } else {
            Err(Kind::UnknownSession(session).into())
        }
    }

    /// Daily session catalog.
    #[must_use]
    pub fn sessions(&self) -> &[SessionSlot] {
        self.config.sessions()
    }

    /// Id the next booked appointment gets.
    #[must_use]
    pub fn next_appointment_id(&self) -> u64 {
        self.next_appointment_id.load(ORD)
    }

    /// Registers a new user.
    /// # Errors
    /// `ErrorKind::Validation` for malformed fields, `ErrorKind::UserExists`
    /// if the username is taken.
    pub async fn signup(&self, user: User) -> Result<()> {
        self.check_initialized()?;
        validate_user(&user)?;
        let mut users = self.users.write().await;
        if users.find_by_username(&user.username)?.is_some() {
            debug!("signup rejected, {} is taken", user.username);
            return Err(Kind::UserExists(user.username).into());
        }
        self.store.add_user(&user).await?;
        info!("user {} signed up as {}", user.username, user.role);
        users.add(user);
        users.insertion_sort();
        Ok(())
    }

    /// User by username.
    /// # Errors
    /// `ErrorKind::Uninitialized` before `init`.
    pub async fn user(&self, username: &str) -> Result<Option<User>> {
        self.check_initialized()?;
        Ok(self.users.read().await.find_by_username(username)?.cloned())
    }

    /// User by mobile number.
    /// # Errors
    /// `ErrorKind::Uninitialized` before `init`.
    pub async fn user_by_mobile(&self, mobile_number: u64) -> Result<Option<User>> {
        self.check_initialized()?;
        Ok(self
            .users
            .read()
            .await
            .search_by_mobile_number(mobile_number)
            .cloned())
    }

    /// Active dentists in username order.
    /// # Errors
    /// `ErrorKind::Uninitialized` before `init`.
    pub async fn dentists(&self) -> Result<Vec<User>> {
        self.check_initialized()?;
        Ok(self.users.read().await.dentists().into_iter().cloned().collect())
    }

    /// All users in username order, soft-deleted included.
    /// # Errors
    /// `ErrorKind::Uninitialized` before `init`.
    pub async fn users(&self) -> Result<Vec<User>> {
        self.check_initialized()?;
        Ok(self.users.read().await.iter().cloned().collect())
    }

    /// Edits a user with `f` and returns the stored result.
    /// # Errors
    /// `ErrorKind::UserNotFound` for an unknown username,
    /// `ErrorKind::Validation` if `f` changes the username or leaves a
    /// malformed field.
    pub async fn update_user<F>(&self, username: &str, f: F) -> Result<User>
    where
        F: FnOnce(&mut User) + Send,
    {
        self.check_initialized()?;
        let mut users = self.users.write().await;
        let old = users
            .find_by_username(username)?
            .cloned()
            .ok_or_else(|| Error::user_not_found(username))?;
        let mut new = old.clone();
        f(&mut new);
        if new.username != old.username {
            return Err(Error::validation("username can't be changed"));
        }
        validate_user(&new)?;
        self.store.update_user(&old, &new).await?;
        users.update(username, |user| *user = new.clone())?;
        debug!("user {} updated", username);
        Ok(new)
    }

    /// Soft-deletes a user, the record stays linked so appointments keep
    /// resolving it.
    /// # Errors
    /// `ErrorKind::UserNotFound` for an unknown username.
    pub async fn delete_user(&self, username: &str) -> Result<User> {
        let user = self.update_user(username, |user| user.is_deleted = true).await?;
        info!("user {} deleted", username);
        Ok(user)
    }

    fn active_user<'a>(users: &'a UserIndex, username: &str) -> Result<&'a User> {
        users
            .find_by_username(username)?
            .filter(|user| !user.is_deleted)
            .ok_or_else(|| Error::user_not_found(username))
    }

    fn active_dentist<'a>(users: &'a UserIndex, username: &str) -> Result<&'a User> {
        let dentist = Self::active_user(users, username)?;
        if dentist.is_dentist() {
            Ok(dentist)
        } else {
            Err(Kind::NotADentist(username.to_owned()).into())
        }
    }

    fn active_patient<'a>(users: &'a UserIndex, username: &str) -> Result<&'a User> {
        let patient = Self::active_user(users, username)?;
        if patient.is_patient() {
            Ok(patient)
        } else {
            Err(Kind::NotAPatient(username.to_owned()).into())
        }
    }

    /// Books the dentist's session on `date` for the patient.
    ///
    /// The slot check and the insert run under one appointment write lock,
    /// concurrent bookings of the same slot can't both succeed.
    /// # Errors
    /// `ErrorKind::SlotTaken` if the session is already booked,
    /// `ErrorKind::UnknownSession`, `ErrorKind::UserNotFound`,
    /// `ErrorKind::NotAPatient` or `ErrorKind::NotADentist` for bad references.
    pub async fn book(
        &self,
        patient: &str,
        dentist: &str,
        date: &Date,
        session: u32,
    ) -> Result<Appointment> {
        self.check_initialized()?;
        self.check_session(session)?;
        let users = self.users.read().await;
        Self::active_patient(&users, patient)?;
        Self::active_dentist(&users, dentist)?;
        let mut appointments = self.appointments.write().await;
        if appointments.is_occupied(dentist, date, session, None) {
            debug!("session {} of {} on {} is taken", session, dentist, date);
            return Err(Error::slot_taken(dentist, date, session));
        }
        let id = self.next_appointment_id.fetch_add(1, ORD);
        let appointment = Appointment::new(id, patient, dentist, date.clone(), session);
        self.store.add_appointment(&appointment).await?;
        appointments.add(appointment.clone());
        info!("booked {}", appointment);
        Ok(appointment)
    }

    /// Moves an appointment to another dentist, date or session.
    ///
    /// On the same date the appointment is changed in place and keeps its id.
    /// A new date replaces it with a new appointment under a new id.
    /// # Errors
    /// `ErrorKind::AppointmentNotFound` for an unknown id, otherwise the same
    /// errors as [`book`](Clinic::book).
    pub async fn reschedule(
        &self,
        id: u64,
        dentist: &str,
        date: &Date,
        session: u32,
    ) -> Result<Appointment> {
        self.check_initialized()?;
        self.check_session(session)?;
        let users = self.users.read().await;
        Self::active_dentist(&users, dentist)?;
        let mut appointments = self.appointments.write().await;
        let old = appointments
            .get_by_id(id)
            .cloned()
            .ok_or_else(|| Error::appointment_not_found(id))?;
        if appointments.is_occupied(dentist, date, session, Some(id)) {
            debug!("session {} of {} on {} is taken", session, dentist, date);
            return Err(Error::slot_taken(dentist, date, session));
        }
        let new = if old.date == *date {
            let new = Appointment {
                dentist: dentist.to_owned(),
                session,
                ..old.clone()
            };
            self.store.update_appointment(&old, &new).await?;
            appointments.reassign(id, dentist, session)?
        } else {
            let new_id = self.next_appointment_id.fetch_add(1, ORD);
            let new = Appointment::new(new_id, old.patient.clone(), dentist, date.clone(), session);
            self.store.update_appointment(&old, &new).await?;
            appointments.add(new.clone());
            appointments.remove(&old)?;
            new
        };
        info!("{} rescheduled to {}", old, new);
        Ok(new)
    }

    /// Cancels an appointment.
    /// # Errors
    /// `ErrorKind::AppointmentNotFound` for an unknown id.
    pub async fn cancel(&self, id: u64) -> Result<Appointment> {
        self.check_initialized()?;
        let mut appointments = self.appointments.write().await;
        let appointment = appointments
            .get_by_id(id)
            .cloned()
            .ok_or_else(|| Error::appointment_not_found(id))?;
        self.store.delete_appointment(id).await?;
        let removed = appointments.remove(&appointment)?;
        info!("cancelled {}", removed);
        Ok(removed)
    }

    /// Appointment by id.
    /// # Errors
    /// `ErrorKind::Uninitialized` before `init`.
    pub async fn appointment(&self, id: u64) -> Result<Option<Appointment>> {
        self.check_initialized()?;
        Ok(self.appointments.read().await.get_by_id(id).cloned())
    }

    /// Every appointment visible in `scope`, oldest first.
    /// # Errors
    /// `ErrorKind::Uninitialized` before `init`.
    pub async fn appointments(&self, scope: &Scope) -> Result<Vec<Appointment>> {
        self.check_initialized()?;
        let appointments = self.appointments.read().await;
        Ok(appointments.all_appointments(scope).into_iter().cloned().collect())
    }

    /// Appointments from today on, visible in `scope`.
    /// # Errors
    /// `ErrorKind::Uninitialized` before `init`.
    pub async fn upcoming(&self, scope: &Scope) -> Result<Vec<Appointment>> {
        self.check_initialized()?;
        let appointments = self.appointments.read().await;
        Ok(appointments.upcoming(scope).into_iter().cloned().collect())
    }

    /// Appointments on `date` visible in `scope`.
    /// # Errors
    /// `ErrorKind::Uninitialized` before `init`.
    pub async fn by_date(&self, date: &Date, scope: &Scope) -> Result<Vec<Appointment>> {
        self.check_initialized()?;
        let appointments = self.appointments.read().await;
        Ok(appointments.get_by_date(date, scope).into_iter().cloned().collect())
    }

    /// The session catalog with the dentist's booked sessions on `date`
    /// marked unavailable.
    /// # Errors
    /// `ErrorKind::UserNotFound` or `ErrorKind::NotADentist` for a bad
    /// dentist.
    pub async fn availability(&self, dentist: &str, date: &Date) -> Result<Vec<SlotAvailability>> {
        self.check_initialized()?;
        let users = self.users.read().await;
        Self::active_dentist(&users, dentist)?;
        let appointments = self.appointments.read().await;
        let booked: HashSet<u32> = appointments
            .get_by_date(date, &Scope::Dentist(dentist.to_owned()))
            .into_iter()
            .map(|appointment| appointment.session)
            .collect();
        Ok(self
            .config
            .sessions()
            .iter()
            .map(|slot| SlotAvailability {
                slot: slot.clone(),
                available: !booked.contains(&slot.number),
            })
            .collect())
    }

    /// Runs a conjunctive search, one task per supplied query field.
    /// # Errors
    /// `ErrorKind::SearchTimeout` or `ErrorKind::SearchTaskFailed` if a
    /// search task does not deliver.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Appointment>> {
        self.check_initialized()?;
        let predicates = query.predicates(&*self.users.read().await);
        self.search.run(self.appointments.clone(), predicates).await
    }
}
