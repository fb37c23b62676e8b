// libs/scheduling-cell/src/services/session.rs
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Appointment, DoctorRef, Operation, PersonRef, Role, SchedulingError};

/// Which operations each role may attempt at all. Ownership of the targeted
/// appointment is checked separately by [`SessionContext::authorize_on`].
const PERMISSIONS: &[(Role, &[Operation])] = &[
    (
        Role::Patient,
        &[
            Operation::ViewAvailable,
            Operation::ViewBookings,
            Operation::Book,
            Operation::Release,
        ],
    ),
    (
        Role::Doctor,
        &[
            Operation::ViewBookings,
            Operation::Confirm,
            Operation::Unconfirm,
        ],
    ),
];

/// Caller identity for one scheduling entry. Read-only once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub role: Role,
    pub identity: String,
    pub display_name: String,
    /// Treating doctor of a patient; the calendar the patient books into.
    #[serde(default)]
    pub assigned_doctor: Option<DoctorRef>,
}

impl SessionContext {
    pub fn patient(
        identity: impl Into<String>,
        display_name: impl Into<String>,
        assigned_doctor: Option<DoctorRef>,
    ) -> Self {
        Self {
            role: Role::Patient,
            identity: identity.into(),
            display_name: display_name.into(),
            assigned_doctor,
        }
    }

    pub fn doctor(identity: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            role: Role::Doctor,
            identity: identity.into(),
            display_name: display_name.into(),
            assigned_doctor: None,
        }
    }

    /// "First Last", or empty when either part is unknown.
    pub fn full_name(first_name: Option<&str>, last_name: Option<&str>) -> String {
        match (first_name, last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            _ => String::new(),
        }
    }

    pub fn person(&self) -> PersonRef {
        PersonRef::new(self.identity.clone(), self.display_name.clone())
    }

    /// Doctor whose calendar is generated for this session.
    pub fn calendar_doctor(&self) -> DoctorRef {
        match self.role {
            Role::Doctor => self.person(),
            Role::Patient => self.assigned_doctor.clone().unwrap_or_default(),
        }
    }

    pub fn permits(&self, operation: Operation) -> bool {
        PERMISSIONS
            .iter()
            .find(|(role, _)| *role == self.role)
            .map(|(_, allowed)| allowed.contains(&operation))
            .unwrap_or(false)
    }

    pub fn authorize(&self, operation: Operation) -> Result<(), SchedulingError> {
        if self.permits(operation) {
            Ok(())
        } else {
            warn!("'{}' ({}) attempted to {}", self.identity, self.role, operation);
            Err(SchedulingError::Unauthorized {
                role: self.role,
                operation,
            })
        }
    }

    /// Role check plus ownership: patients act on their own bookings,
    /// doctors on bookings in their calendar.
    pub fn authorize_on(&self, operation: Operation, appointment: &Appointment) -> Result<(), SchedulingError> {
        self.authorize(operation)?;

        if self.owns(appointment) {
            Ok(())
        } else {
            warn!(
                "'{}' ({}) attempted to {} on appointment {} they do not own",
                self.identity,
                self.role,
                operation,
                appointment.id()
            );
            Err(SchedulingError::Unauthorized {
                role: self.role,
                operation,
            })
        }
    }

    /// Bookings shown in the managing list.
    pub fn can_see(&self, appointment: &Appointment) -> bool {
        self.owns(appointment)
    }

    fn owns(&self, appointment: &Appointment) -> bool {
        match self.role {
            Role::Patient => appointment.patient.identity == self.identity,
            Role::Doctor => appointment.slot.doctor.identity == self.identity,
        }
    }
}
