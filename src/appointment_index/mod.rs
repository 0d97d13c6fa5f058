use crate::prelude::*;
use tree::Tree;

mod tree;

/// Appointments kept in an unbalanced binary search tree keyed by date.
///
/// Same-day appointments are chained through right children. Date lookups
/// descend a single path, everything keyed by other fields walks the whole
/// tree in order.
#[derive(Debug, Default)]
pub struct AppointmentIndex {
    tree: Tree<Date, Appointment>,
}

impl AppointmentIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an appointment under its date. The double-booking check is the
    /// caller's job, see [`is_occupied`](AppointmentIndex::is_occupied).
    pub fn add(&mut self, appointment: Appointment) {
        trace!("add {}", appointment);
        self.tree.insert(appointment.date.clone(), appointment);
    }

    /// Removes the stored appointment with the same date and id.
    /// # Errors
    /// `ErrorKind::EmptyTree` if the index is empty, `ErrorKind::NodeNotFound`
    /// if the appointment is not stored under its date.
    pub fn remove(&mut self, appointment: &Appointment) -> Result<Appointment> {
        let removed = self
            .tree
            .remove(&appointment.date, |stored| stored.id == appointment.id)?;
        debug!("removed {}", removed);
        Ok(removed)
    }

    /// Locates an appointment by id and removes it.
    /// # Errors
    /// `ErrorKind::EmptyTree` if the index is empty,
    /// `ErrorKind::AppointmentNotFound` if no appointment has this id.
    pub fn remove_by_id(&mut self, id: u64) -> Result<Appointment> {
        if self.tree.is_empty() {
            return Err(Error::empty_tree());
        }
        let date = self
            .get_by_id(id)
            .map(|appointment| appointment.date.clone())
            .ok_or_else(|| Error::appointment_not_found(id))?;
        let removed = self.tree.remove(&date, |stored| stored.id == id)?;
        debug!("removed {}", removed);
        Ok(removed)
    }

    /// Full traversal looking for the id, the id is not the ordering key.
    #[must_use]
    pub fn get_by_id(&self, id: u64) -> Option<&Appointment> {
        self.iter().find(|appointment| appointment.id == id)
    }

    /// Appointments on `date` visible in `scope`, in insertion order.
    #[must_use]
    pub fn get_by_date(&self, date: &Date, scope: &Scope) -> Vec<&Appointment> {
        self.tree
            .get_all(date)
            .into_iter()
            .filter(|appointment| scope.matches(appointment))
            .collect()
    }

    /// In-order traversal keeping appointments that satisfy the predicate.
    #[must_use]
    pub fn search_all_by_field(&self, predicate: &Predicate) -> Vec<&Appointment> {
        self.iter()
            .filter(|appointment| predicate.matches(appointment))
            .collect()
    }

    /// Every appointment visible in `scope`, oldest first.
    #[must_use]
    pub fn all_appointments(&self, scope: &Scope) -> Vec<&Appointment> {
        self.from_date(scope, Date::far_past())
    }

    /// Appointments from today on, visible in `scope`.
    #[must_use]
    pub fn upcoming(&self, scope: &Scope) -> Vec<&Appointment> {
        self.from_date(scope, Date::today())
    }

    /// Appointments on or after `today`, visible in `scope`.
    #[must_use]
    pub fn upcoming_from(&self, scope: &Scope, today: &Date) -> Vec<&Appointment> {
        self.from_date(scope, today.clone())
    }

    fn from_date(&self, scope: &Scope, from: Date) -> Vec<&Appointment> {
        self.tree
            .range_from(from)
            .map(|(_, appointment)| appointment)
            .filter(|appointment| scope.matches(appointment))
            .collect()
    }

    /// Checks for an appointment matching the whole tuple.
    #[must_use]
    pub fn contains(&self, date: &Date, session: u32, dentist: &str, patient: &str) -> bool {
        self.iter().any(|appointment| {
            appointment.date == *date
                && appointment.session == session
                && appointment.dentist == dentist
                && appointment.patient == patient
        })
    }

    /// Checks whether the dentist's session on `date` is held by an
    /// appointment other than `except`.
    #[must_use]
    pub fn is_occupied(&self, dentist: &str, date: &Date, session: u32, except: Option<u64>) -> bool {
        self.get_by_date(date, &Scope::Dentist(dentist.to_owned()))
            .into_iter()
            .any(|appointment| appointment.session == session && Some(appointment.id) != except)
    }

    /// Changes dentist and session in place. The date is the ordering key and
    /// is never changed in place.
    /// # Errors
    /// `ErrorKind::AppointmentNotFound` if no appointment has this id.
    pub fn reassign(&mut self, id: u64, dentist: &str, session: u32) -> Result<Appointment> {
        let appointment = self
            .tree
            .find_mut(|appointment| appointment.id == id)
            .ok_or_else(|| Error::appointment_not_found(id))?;
        appointment.dentist = dentist.to_owned();
        appointment.session = session;
        debug!("reassigned {}", appointment);
        Ok(appointment.clone())
    }

    /// Iterates over all appointments in date order.
    pub fn iter(&self) -> impl Iterator<Item = &Appointment> {
        self.tree.iter().map(|(_, appointment)| appointment)
    }

    /// Number of stored appointments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Checks the index holds no appointments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Depth of the deepest node.
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Checks the ordering invariant: every date in a left subtree is
    /// earlier than its ancestor's, every date in a right subtree is the
    /// same or later.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.tree.check_invariant()
    }
}
