#![allow(dead_code)]

use chrono::Local;
use env_logger::fmt::Color;
use log::Level;
use std::io::Write;
use tempfile::TempDir;

use molar::{Builder, Clinic, Date, MemoryStore, Role, User};

pub fn init_logger() {
    env_logger::builder()
        .format(|buf, record: &log::Record| {
            let mut style = buf.style();
            let color = match record.level() {
                Level::Error => Color::Red,
                Level::Warn => Color::Yellow,
                Level::Info => Color::Green,
                Level::Debug => Color::Cyan,
                Level::Trace => Color::White,
            };
            style.set_color(color);
            writeln!(
                buf,
                "[{} {} {:>30}:{:^4}] - {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S"),
                style.value(record.level()),
                record.module_path().unwrap_or(""),
                style.value(record.line().unwrap_or(0)),
                style.value(record.args())
            )
        })
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init()
        .unwrap_or(());
}

pub fn date(s: &str) -> Date {
    Date::parse(s).unwrap()
}

pub fn patient(username: &str, mobile_number: u64) -> User {
    User::new(username, "hash", Role::Patient, "Pat", "Ient").with_mobile_number(mobile_number)
}

pub fn dentist(username: &str) -> User {
    User::new(username, "hash", Role::Dentist, "Den", "Tist")
}

pub fn seed_users() -> Vec<User> {
    vec![
        patient("cara01", 91111113),
        dentist("drlee1"),
        patient("amy001", 91111111),
        dentist("drkim1"),
        patient("bob001", 91111112),
        User::new("admin1", "hash", Role::Admin, "Ad", "Min"),
    ]
}

/// Initialized clinic over an in-memory store seeded with `seed_users`.
pub async fn memory_clinic() -> (Clinic, MemoryStore) {
    init_logger();
    let store = MemoryStore::with_records(seed_users(), Vec::new());
    let clinic = Builder::new().store(store.clone()).build().unwrap();
    clinic.init().await.unwrap();
    (clinic, store)
}

/// Clinic over JSON files in a fresh temp dir, not initialized yet.
pub fn json_clinic() -> (Clinic, TempDir) {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let clinic = Builder::new()
        .work_dir(dir.path().join("data"))
        .build()
        .unwrap();
    (clinic, dir)
}
