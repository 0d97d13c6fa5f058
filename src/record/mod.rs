mod appointment;
mod date;
mod filter;
mod session;
mod user;

pub use appointment::Appointment;
pub use date::Date;
pub use filter::{Predicate, Scope};
pub use session::{default_sessions, SessionSlot, SlotAvailability};
pub use user::{Role, User};
