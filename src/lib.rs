#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

//! # molar
//!
//! The `molar` crate provides the in-memory indexing and query layer of a
//! dental clinic booking service.
//!
//! Users are kept in a [`UserIndex`], a doubly linked list sorted by username
//! and searched with a binary search that walks node links. Appointments are
//! kept in an [`AppointmentIndex`], an unbalanced binary search tree keyed by
//! the appointment date. Multi-field queries are answered by a
//! [`ConjunctiveSearch`], which fans one task out per field predicate and
//! intersects their results by frequency count.
//!
//! [`Clinic`] ties the indexes together into process-wide shared state,
//! serializes the double-booking check with the insert and writes every
//! mutation through to a [`Store`].
//!
//! # Examples
//!
//! ```no_run
//! use molar::{Builder, Date, Role, User};
//!
//! #[tokio::main]
//! async fn main() -> molar::Result<()> {
//!     let clinic = Builder::new().work_dir("/tmp/molar/").build()?;
//!     clinic.init().await?;
//!     let date = Date::parse("2024-04-01")?;
//!     let appointment = clinic.book("patient01", "dentist01", &date, 2).await?;
//!     println!("booked {}", appointment.id);
//!     Ok(())
//! }
//! ```

#[macro_use]
extern crate log;

/// Basic info about current build.
pub mod build_info;

/// Signup input rules.
pub mod validation;

mod appointment_index;
mod clinic;
mod error;
mod record;
mod search;
mod store;
mod user_index;

pub use self::{
    appointment_index::AppointmentIndex,
    clinic::{Builder, Clinic},
    error::{Error, Kind as ErrorKind, Result},
    record::{
        default_sessions, Appointment, Date, Predicate, Role, Scope, SessionSlot,
        SlotAvailability, User,
    },
    search::{intersect, ConjunctiveSearch, SearchQuery},
    store::{JsonStore, MemoryStore, Store},
    user_index::UserIndex,
};

mod prelude {
    pub(crate) use super::{
        error::{Error, Kind, Result},
        record::{Appointment, Date, Predicate, Role, Scope, SessionSlot, SlotAvailability, User},
    };
    pub(crate) use anyhow::{Context, Result as AnyResult};
    pub(crate) use serde_derive::{Deserialize, Serialize};
    pub(crate) use std::{
        cmp::Ordering as CmpOrdering,
        collections::HashMap,
        fmt::{Debug, Display, Formatter, Result as FmtResult},
        path::{Path, PathBuf},
        sync::{
            atomic::{AtomicBool, AtomicU64, Ordering},
            Arc,
        },
        time::Duration,
    };
    pub(crate) use tokio::sync::{Mutex, RwLock};

    pub(crate) const ORD: Ordering = Ordering::Relaxed;
}
