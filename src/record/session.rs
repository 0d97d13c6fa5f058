use crate::prelude::*;

/// Fixed daily time slot appointments are booked into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSlot {
    /// Slot number, 1-based.
    pub number: u32,
    /// Start time, `HH:MM`.
    pub start: String,
    /// End time, `HH:MM`.
    pub end: String,
}

impl SessionSlot {
    /// Creates a slot.
    pub fn new(number: u32, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            number,
            start: start.into(),
            end: end.into(),
        }
    }
}

/// A slot of a dentist's day with its booking state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAvailability {
    /// The slot.
    pub slot: SessionSlot,
    /// `false` when an appointment already occupies the slot.
    pub available: bool,
}

/// Clinic opening hours: seven one-hour slots with a lunch break.
#[must_use]
pub fn default_sessions() -> Vec<SessionSlot> {
    [
        ("09:00", "10:00"),
        ("10:00", "11:00"),
        ("11:00", "12:00"),
        ("13:00", "14:00"),
        ("14:00", "15:00"),
        ("15:00", "16:00"),
        ("16:00", "17:00"),
    ]
    .iter()
    .zip(1..)
    .map(|(&(start, end), number)| SessionSlot::new(number, start, end))
    .collect()
}
