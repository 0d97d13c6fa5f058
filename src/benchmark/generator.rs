use chrono::{Duration as ChronoDuration, NaiveDate};
use molar::{Appointment, Date, Role, User};
use rand::{rngs::ThreadRng, Rng};
use std::collections::HashSet;

const SESSIONS: u32 = 7;

pub struct Generator {
    rng: ThreadRng,
    dentists: usize,
    patients: usize,
    days: usize,
    first_day: NaiveDate,
}

impl Generator {
    pub fn new(dentists: usize, patients: usize, days: usize) -> Self {
        Self {
            rng: ThreadRng::default(),
            dentists: dentists.max(1),
            patients: patients.max(1),
            days: days.max(1),
            first_day: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }

    pub fn users(&self) -> Vec<User> {
        let dentists = (0..self.dentists).map(|i| {
            User::new(dentist_name(i), "hash", Role::Dentist, "Doctor", "Bench")
        });
        let patients = (0..self.patients).map(|i| {
            User::new(patient_name(i), "hash", Role::Patient, "Patient", "Bench")
                .with_mobile_number(80_000_000 + i as u64)
        });
        dentists.chain(patients).collect()
    }

    /// Up to `count` appointments, slot collisions are dropped.
    pub fn appointments(&mut self, count: usize) -> Vec<Appointment> {
        let mut taken = HashSet::new();
        let mut appointments = Vec::with_capacity(count);
        for id in 1..=count as u64 {
            let dentist = self.dentist();
            let date = self.date();
            let session = self.session();
            if taken.insert((dentist.clone(), date.clone(), session)) {
                appointments.push(Appointment::new(id, self.patient(), dentist, date, session));
            }
        }
        appointments
    }

    pub fn dentist(&mut self) -> String {
        dentist_name(self.rng.gen_range(0..self.dentists))
    }

    pub fn patient(&mut self) -> String {
        patient_name(self.rng.gen_range(0..self.patients))
    }

    pub fn date(&mut self) -> Date {
        let offset = self.rng.gen_range(0..self.days) as i64;
        Date::from_naive(self.first_day + ChronoDuration::days(offset))
    }

    pub fn session(&mut self) -> u32 {
        self.rng.gen_range(1..=SESSIONS)
    }
}

fn dentist_name(i: usize) -> String {
    format!("dentist{:05}", i)
}

fn patient_name(i: usize) -> String {
    format!("patient{:06}", i)
}
