use crate::{prelude::*, user_index::UserIndex};

/// Optional fields of an appointment search, each supplied field becomes one
/// predicate.
///
/// The patient may be given by username or by mobile number. A mobile number
/// is resolved against the user index, an unknown number yields a predicate
/// nothing satisfies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    dentist: Option<String>,
    date: Option<Date>,
    patient: Option<String>,
    patient_mobile: Option<u64>,
    session: Option<u32>,
}

impl SearchQuery {
    /// Creates a query without fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dentist username.
    #[must_use]
    pub fn dentist(mut self, username: impl Into<String>) -> Self {
        self.dentist = Some(username.into());
        self
    }

    /// Appointment date.
    #[must_use]
    pub fn date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }

    /// Patient username.
    #[must_use]
    pub fn patient(mut self, username: impl Into<String>) -> Self {
        self.patient = Some(username.into());
        self
    }

    /// Patient mobile number.
    #[must_use]
    pub fn patient_mobile(mut self, mobile_number: u64) -> Self {
        self.patient_mobile = Some(mobile_number);
        self
    }

    /// Session number.
    #[must_use]
    pub fn session(mut self, session: u32) -> Self {
        self.session = Some(session);
        self
    }

    /// Checks that no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Resolves the query into zero to four predicates.
    ///
    /// A patient username and a mobile number naming different users
    /// contradict each other and produce a patient predicate that matches
    /// nothing.
    #[must_use]
    pub fn predicates(&self, users: &UserIndex) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(4);
        if let Some(dentist) = &self.dentist {
            predicates.push(Predicate::Dentist(dentist.clone()));
        }
        if let Some(date) = &self.date {
            predicates.push(Predicate::Date(date.clone()));
        }
        let by_mobile = self.patient_mobile.map(|mobile_number| {
            let resolved = users
                .search_by_mobile_number(mobile_number)
                .map(|user| user.username.clone());
            if resolved.is_none() {
                debug!("no user with mobile number {}", mobile_number);
            }
            resolved.unwrap_or_default()
        });
        let patient = match (&self.patient, by_mobile) {
            (Some(username), Some(resolved)) if *username != resolved => Some(String::new()),
            (Some(username), _) => Some(username.clone()),
            (None, resolved) => resolved,
        };
        if let Some(patient) = patient {
            predicates.push(Predicate::Patient(patient));
        }
        if let Some(session) = self.session {
            predicates.push(Predicate::Session(session));
        }
        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> UserIndex {
        let mut users = UserIndex::new();
        users.add(User::new("amy01", "x", Role::Patient, "Amy", "Tan").with_mobile_number(91234567));
        users.add(User::new("bob01", "x", Role::Patient, "Bob", "Lim").with_mobile_number(81234567));
        users.insertion_sort();
        users
    }

    #[test]
    fn empty_query_has_no_predicates() {
        let query = SearchQuery::new();
        assert!(query.is_empty());
        assert!(query.predicates(&users()).is_empty());
    }

    #[test]
    fn every_field_is_one_predicate() {
        let day = Date::parse("2024-04-01").unwrap();
        let query = SearchQuery::new()
            .dentist("drlee")
            .date(day.clone())
            .patient_mobile(91234567)
            .session(2);
        assert_eq!(
            query.predicates(&users()),
            vec![
                Predicate::Dentist("drlee".into()),
                Predicate::Date(day),
                Predicate::Patient("amy01".into()),
                Predicate::Session(2),
            ]
        );
    }

    #[test]
    fn unknown_or_conflicting_patient_matches_nothing() {
        let unknown = SearchQuery::new().patient_mobile(80000000);
        assert_eq!(unknown.predicates(&users()), vec![Predicate::Patient(String::new())]);
        let conflict = SearchQuery::new().patient("bob01").patient_mobile(91234567);
        assert_eq!(conflict.predicates(&users()), vec![Predicate::Patient(String::new())]);
        let agree = SearchQuery::new().patient("amy01").patient_mobile(91234567);
        assert_eq!(agree.predicates(&users()), vec![Predicate::Patient("amy01".into())]);
    }
}
