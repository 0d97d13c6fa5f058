use crate::prelude::*;

/// Role-based visibility of appointments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every appointment.
    All,
    /// Appointments of the dentist with this username.
    Dentist(String),
    /// Appointments of the patient with this username.
    Patient(String),
}

impl Scope {
    /// Scope a user sees: own appointments for patients and dentists,
    /// everything for admins.
    #[must_use]
    pub fn of(user: &User) -> Self {
        match user.role {
            Role::Patient => Scope::Patient(user.username.clone()),
            Role::Dentist => Scope::Dentist(user.username.clone()),
            Role::Admin => Scope::All,
        }
    }

    /// Checks whether the appointment is visible in this scope.
    #[must_use]
    pub fn matches(&self, appointment: &Appointment) -> bool {
        match self {
            Scope::All => true,
            Scope::Dentist(username) => appointment.dentist == *username,
            Scope::Patient(username) => appointment.patient == *username,
        }
    }
}

/// Single-field equality predicate over appointments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Dentist username equals.
    Dentist(String),
    /// Date equals.
    Date(Date),
    /// Patient username equals.
    Patient(String),
    /// Session number equals.
    Session(u32),
}

impl Predicate {
    /// Checks the predicate against an appointment.
    #[must_use]
    pub fn matches(&self, appointment: &Appointment) -> bool {
        match self {
            Predicate::Dentist(username) => appointment.dentist == *username,
            Predicate::Date(date) => appointment.date == *date,
            Predicate::Patient(username) => appointment.patient == *username,
            Predicate::Session(session) => appointment.session == *session,
        }
    }

    /// Name of the field the predicate tests.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Predicate::Dentist(_) => "dentist",
            Predicate::Date(_) => "date",
            Predicate::Patient(_) => "patient",
            Predicate::Session(_) => "session",
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Predicate::Dentist(v) | Predicate::Patient(v) => write!(f, "{} = {}", self.field(), v),
            Predicate::Date(v) => write!(f, "{} = {}", self.field(), v),
            Predicate::Session(v) => write!(f, "{} = {}", self.field(), v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment() -> Appointment {
        Appointment::new(7, "amy01", "drlee", Date::parse("2024-04-01").unwrap(), 2)
    }

    #[test]
    fn scope_follows_role() {
        let admin = User::new("root1", "x", Role::Admin, "Root", "Admin");
        let patient = User::new("amy01", "x", Role::Patient, "Amy", "Tan");
        let dentist = User::new("drkim", "x", Role::Dentist, "Kim", "Ong");
        assert!(Scope::of(&admin).matches(&appointment()));
        assert!(Scope::of(&patient).matches(&appointment()));
        assert!(!Scope::of(&dentist).matches(&appointment()));
    }

    #[test]
    fn predicate_tests_single_field() {
        let a = appointment();
        assert!(Predicate::Dentist("drlee".into()).matches(&a));
        assert!(Predicate::Patient("amy01".into()).matches(&a));
        assert!(Predicate::Date(Date::parse("2024-04-01").unwrap()).matches(&a));
        assert!(!Predicate::Session(3).matches(&a));
        assert_eq!(Predicate::Session(3).to_string(), "session = 3");
    }
}
