use crate::prelude::*;
use thiserror::Error;

/// A specialized index result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for index, search and clinic operations.
#[derive(Debug, Error)]
#[error("{repr}")]
pub struct Error {
    repr: Repr,
}

impl Error {
    /// Returns the corresponding `ErrorKind` for this error.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match &self.repr {
            Repr::Inner(k) => k.clone(),
            Repr::Other(_) => Kind::Other,
        }
    }

    /// Checks whether the error is of the given kind.
    #[must_use]
    pub fn is(&self, other: &Kind) -> bool {
        if let Repr::Inner(kind) = &self.repr {
            kind == other
        } else {
            false
        }
    }

    pub(crate) fn new<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self {
            repr: Repr::Other(error.into()),
        }
    }

    pub(crate) fn empty_list() -> Self {
        Kind::EmptyList.into()
    }

    pub(crate) fn invalid_index(index: usize, len: usize) -> Self {
        Kind::InvalidIndex { index, len }.into()
    }

    pub(crate) fn empty_tree() -> Self {
        Kind::EmptyTree.into()
    }

    pub(crate) fn node_not_found() -> Self {
        Kind::NodeNotFound.into()
    }

    pub(crate) fn unsorted() -> Self {
        Kind::Unsorted.into()
    }

    pub(crate) fn user_not_found(username: impl Into<String>) -> Self {
        Kind::UserNotFound(username.into()).into()
    }

    pub(crate) fn appointment_not_found(id: u64) -> Self {
        Kind::AppointmentNotFound(id).into()
    }

    pub(crate) fn slot_taken(dentist: &str, date: &Date, session: u32) -> Self {
        Kind::SlotTaken {
            dentist: dentist.to_owned(),
            date: date.to_string(),
            session,
        }
        .into()
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Kind::Validation(reason.into()).into()
    }

    pub(crate) fn wrong_config(reason: impl Into<String>) -> Self {
        Kind::WrongConfig(reason.into()).into()
    }

    pub(crate) fn store(error: anyhow::Error) -> Self {
        Kind::Store(format!("{:#}", error)).into()
    }
}

impl From<Kind> for Error {
    #[must_use]
    fn from(kind: Kind) -> Self {
        Self {
            repr: Repr::Inner(kind),
        }
    }
}

impl From<std::io::Error> for Error {
    #[must_use]
    fn from(e: std::io::Error) -> Self {
        Kind::Io(e.to_string()).into()
    }
}

impl From<serde_json::Error> for Error {
    #[must_use]
    fn from(e: serde_json::Error) -> Self {
        Kind::Json(e.to_string()).into()
    }
}

impl From<anyhow::Error> for Error {
    #[must_use]
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<Error>() {
            Ok(inner) => inner,
            Err(other) => Self::new(other),
        }
    }
}

#[derive(Debug)]
enum Repr {
    Inner(Kind),
    Other(anyhow::Error),
}

impl Display for Repr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Repr::Inner(kind) => Display::fmt(kind, f),
            Repr::Other(e) => write!(f, "{:#}", e),
        }
    }
}

/// A list specifying categories of index and clinic errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Kind {
    /// Operation requires at least one element in the user list.
    #[error("empty linked list")]
    EmptyList,
    /// Positional access outside of the list bounds.
    #[error("invalid index position {index} (list size {len})")]
    InvalidIndex {
        /// Requested position.
        index: usize,
        /// List size at the moment of the request.
        len: usize,
    },
    /// Removal from a tree without nodes.
    #[error("tree is empty")]
    EmptyTree,
    /// Removal of a node that is not linked into the tree.
    #[error("node not found in tree")]
    NodeNotFound,
    /// Username binary search on a list appended to since the last sort.
    #[error("user list is not sorted, run insertion sort first")]
    Unsorted,
    /// No user with the given username.
    #[error("user {0} not found")]
    UserNotFound(String),
    /// Username is already registered.
    #[error("user {0} already exists")]
    UserExists(String),
    /// No appointment with the given id.
    #[error("appointment {0} not found")]
    AppointmentNotFound(u64),
    /// Dentist already has an appointment at this date and session.
    #[error("session {session} of dentist {dentist} on {date} is already booked")]
    SlotTaken {
        /// Dentist username.
        dentist: String,
        /// Appointment date.
        date: String,
        /// Session number.
        session: u32,
    },
    /// Session number is not part of the daily slot catalog.
    #[error("unknown session {0}")]
    UnknownSession(u32),
    /// Referenced user does not have the dentist role.
    #[error("user {0} is not a dentist")]
    NotADentist(String),
    /// Referenced user does not have the patient role.
    #[error("user {0} is not a patient")]
    NotAPatient(String),
    /// Date is not a valid `YYYY-MM-DD` calendar date.
    #[error("invalid date: {0}")]
    InvalidDate(String),
    /// User input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Input configuration is wrong.
    #[error("wrong config: {0}")]
    WrongConfig(String),
    /// Clinic used before `init`.
    #[error("clinic uninitialized")]
    Uninitialized,
    /// Persistence collaborator failed.
    #[error("store error: {0}")]
    Store(String),
    /// A search task did not deliver its result in time.
    #[error("search task timed out")]
    SearchTimeout,
    /// A search task stopped without delivering its result.
    #[error("search task failed: {0}")]
    SearchTaskFailed(String),
    /// std::io::Error
    #[error("io error: {0}")]
    Io(String),
    /// serde_json::Error
    #[error("json error: {0}")]
    Json(String),
    /// Any error not part of this list
    #[error("other error")]
    Other,
}
