// libs/scheduling-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use navigation_cell::NavigationError;

// ==============================================================================
// SLOT & APPOINTMENT MODELS
// ==============================================================================

/// Zero-padded sequence number of a slot within one generation run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(String);

impl SlotId {
    pub fn from_sequence(sequence: usize) -> Self {
        Self(format!("{:04}", sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SlotId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SlotId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved reference to a person, as handed over by the inviting screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PersonRef {
    pub identity: String,
    pub display_name: String,
}

impl PersonRef {
    pub fn new(identity: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            display_name: display_name.into(),
        }
    }
}

pub type DoctorRef = PersonRef;
pub type PatientRef = PersonRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub doctor: DoctorRef,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
}

impl Slot {
    pub fn display_date(&self) -> String {
        self.date.format("%d-%m-%Y").to_string()
    }

    pub fn display_time(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with {} on {} at {} ({})",
            self.id,
            self.doctor.display_name,
            self.display_date(),
            self.display_time(),
            self.location
        )
    }
}

/// A booked slot. Only ever lives in the booked collection of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub slot: Slot,
    pub confirmed: bool,
    pub patient: PatientRef,
}

impl Appointment {
    pub fn id(&self) -> &SlotId {
        &self.slot.id
    }
}

// ==============================================================================
// SESSION & PERMISSION MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Doctor => write!(f, "doctor"),
        }
    }
}

/// Operations gated by the permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ViewAvailable,
    ViewBookings,
    Book,
    Release,
    Confirm,
    Unconfirm,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ViewAvailable => write!(f, "view available appointments"),
            Operation::ViewBookings => write!(f, "view booked appointments"),
            Operation::Book => write!(f, "book appointments"),
            Operation::Release => write!(f, "delete appointments"),
            Operation::Confirm => write!(f, "confirm appointments"),
            Operation::Unconfirm => write!(f, "unconfirm appointments"),
        }
    }
}

// ==============================================================================
// SCREEN & INTERACTION MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Start,
    Booking,
    Managing,
    Closed,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Start => write!(f, "start"),
            Screen::Booking => write!(f, "booking"),
            Screen::Managing => write!(f, "managing"),
            Screen::Closed => write!(f, "closed"),
        }
    }
}

/// Where a row activation landed in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowTarget {
    Row(SlotId),
    Heading,
    Separator,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    BookSlot,
    ManageBooking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogChoice {
    Book,
    Confirm,
    Unconfirm,
    Delete,
    Cancel,
}

impl fmt::Display for DialogChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogChoice::Book => write!(f, "book"),
            DialogChoice::Confirm => write!(f, "confirm"),
            DialogChoice::Unconfirm => write!(f, "unconfirm"),
            DialogChoice::Delete => write!(f, "delete"),
            DialogChoice::Cancel => write!(f, "cancel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub prompt: String,
    pub row: ScheduleRow,
    pub options: Vec<DialogChoice>,
}

impl Dialog {
    pub fn slot_id(&self) -> &SlotId {
        &self.row.id
    }

    pub fn offers(&self, choice: DialogChoice) -> bool {
        self.options.contains(&choice)
    }
}

/// One rendered line of the available or booked list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub id: SlotId,
    /// Doctor name for patients and for the booking list, patient name for doctors.
    pub counterpart: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub confirmed: Option<bool>,
}

impl ScheduleRow {
    pub fn from_slot(slot: &Slot) -> Self {
        Self {
            id: slot.id.clone(),
            counterpart: slot.doctor.display_name.clone(),
            date: slot.display_date(),
            time: slot.display_time(),
            location: slot.location.clone(),
            confirmed: None,
        }
    }

    pub fn from_appointment(appointment: &Appointment, viewer: Role) -> Self {
        let counterpart = match viewer {
            Role::Patient => appointment.slot.doctor.display_name.clone(),
            Role::Doctor => appointment.patient.display_name.clone(),
        };
        Self {
            counterpart,
            confirmed: Some(appointment.confirmed),
            ..Self::from_slot(&appointment.slot)
        }
    }
}

/// Everything the presentation layer needs to draw the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenState {
    pub screen: Screen,
    pub title: String,
    pub counterpart_label: String,
    pub rows: Vec<ScheduleRow>,
    pub empty_message: Option<String>,
    pub dialog: Option<Dialog>,
    pub back_enabled: bool,
    pub selection_armed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message shown after an operation; the presentation layer removes it after `ttl_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,
    pub ttl_seconds: u64,
}

impl Notice {
    pub fn info(message: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            level: NoticeLevel::Info,
            message: message.into(),
            ttl_seconds,
        }
    }

    pub fn error(message: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            level: NoticeLevel::Error,
            message: message.into(),
            ttl_seconds,
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulingError {
    #[error("Appointment {0} not found")]
    NotFound(SlotId),

    #[error("A {role} is not allowed to {operation}")]
    Unauthorized { role: Role, operation: Operation },

    #[error("No previous screen to go back to")]
    EmptyStack,

    #[error("Invalid slot window: {0}")]
    InvalidSlotWindow(String),

    #[error("No appointment dialog is open")]
    NoDialog,

    #[error("The open dialog does not offer '{0}'")]
    ChoiceNotOffered(DialogChoice),

    #[error("Close the appointment dialog first")]
    DialogOpen,

    #[error("Cannot go from {from} to {to}")]
    InvalidNavigation { from: Screen, to: Screen },

    #[error("A scheduling session is already open")]
    SessionActive,

    #[error("No scheduling session is open")]
    NoSession,
}

impl From<NavigationError> for SchedulingError {
    fn from(err: NavigationError) -> Self {
        match err {
            NavigationError::EmptyStack => SchedulingError::EmptyStack,
        }
    }
}
