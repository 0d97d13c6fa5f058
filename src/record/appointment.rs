use crate::prelude::*;

/// Booked appointment.
///
/// Dentist and patient refer to users by username, the unique key of the
/// user index. The same layout is used on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Caller-assigned unique identifier.
    pub id: u64,
    /// Dentist username.
    pub dentist: String,
    /// Patient username.
    pub patient: String,
    /// Appointment day, the ordering key of the appointment index.
    pub date: Date,
    /// Daily session slot number.
    pub session: u32,
}

impl Appointment {
    /// Creates a new appointment.
    pub fn new(
        id: u64,
        patient: impl Into<String>,
        dentist: impl Into<String>,
        date: Date,
        session: u32,
    ) -> Self {
        Self {
            id,
            dentist: dentist.into(),
            patient: patient.into(),
            date,
            session,
        }
    }

    /// Checks whether this appointment holds the dentist's slot.
    #[must_use]
    pub fn occupies(&self, dentist: &str, date: &Date, session: u32) -> bool {
        self.dentist == dentist && self.date == *date && self.session == session
    }
}

impl Display for Appointment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "appointment {} ({} with {} on {} session {})",
            self.id, self.patient, self.dentist, self.date, self.session
        )
    }
}
