// libs/scheduling-cell/src/services/registry.rs
use std::collections::btree_map::{BTreeMap, Values};

use tracing::{debug, info, warn};

use crate::models::{Appointment, PatientRef, SchedulingError, Slot, SlotId};

/// In-memory state machine over the available and booked collections.
///
/// An id is held by at most one of the two collections. Booking moves a slot
/// to `booked` unconfirmed, confirm/unconfirm flip the flag in place and
/// release moves it back to `available` with patient and flag stripped.
/// Every operation either applies completely or leaves both collections
/// untouched. The registry knows nothing about roles.
#[derive(Debug, Clone, Default)]
pub struct AppointmentRegistry {
    available: BTreeMap<SlotId, Slot>,
    booked: BTreeMap<SlotId, Appointment>,
}

impl AppointmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the available collection with a fresh generation run.
    ///
    /// Slot ids restart at zero on every run, so an id that is still booked
    /// from an earlier run is withheld rather than listed twice. Returns the
    /// number of slots that became available.
    pub fn load_generation(&mut self, slots: impl IntoIterator<Item = Slot>) -> usize {
        self.available.clear();

        for slot in slots {
            if self.booked.contains_key(&slot.id) {
                warn!(
                    "Generated slot {} collides with a booking from an earlier run, withholding it",
                    slot.id
                );
                continue;
            }
            self.available.insert(slot.id.clone(), slot);
        }

        info!(
            "Loaded generation run: {} available, {} booked",
            self.available.len(),
            self.booked.len()
        );
        self.available.len()
    }

    pub fn book(&mut self, id: &SlotId, patient: PatientRef) -> Result<Appointment, SchedulingError> {
        let slot = self
            .available
            .remove(id)
            .ok_or_else(|| SchedulingError::NotFound(id.clone()))?;

        let appointment = Appointment {
            slot,
            confirmed: false,
            patient,
        };
        self.booked.insert(id.clone(), appointment.clone());

        debug!("Slot {} booked by '{}'", id, appointment.patient.identity);
        Ok(appointment)
    }

    pub fn confirm(&mut self, id: &SlotId) -> Result<Appointment, SchedulingError> {
        self.set_confirmed(id, true)
    }

    pub fn unconfirm(&mut self, id: &SlotId) -> Result<Appointment, SchedulingError> {
        self.set_confirmed(id, false)
    }

    pub fn release(&mut self, id: &SlotId) -> Result<Slot, SchedulingError> {
        let appointment = self
            .booked
            .remove(id)
            .ok_or_else(|| SchedulingError::NotFound(id.clone()))?;

        let slot = appointment.slot;
        self.available.insert(id.clone(), slot.clone());

        debug!("Slot {} released by '{}'", id, appointment.patient.identity);
        Ok(slot)
    }

    fn set_confirmed(&mut self, id: &SlotId, confirmed: bool) -> Result<Appointment, SchedulingError> {
        let appointment = self
            .booked
            .get_mut(id)
            .ok_or_else(|| SchedulingError::NotFound(id.clone()))?;

        if appointment.confirmed != confirmed {
            appointment.confirmed = confirmed;
            debug!("Appointment {} confirmed = {}", id, confirmed);
        }
        Ok(appointment.clone())
    }

    /// Available slots in id order. Cloning the iterator restarts the listing.
    pub fn list_available(&self) -> Values<'_, SlotId, Slot> {
        self.available.values()
    }

    /// Booked appointments in id order. Cloning the iterator restarts the listing.
    pub fn list_booked(&self) -> Values<'_, SlotId, Appointment> {
        self.booked.values()
    }

    pub fn get_available(&self, id: &SlotId) -> Option<&Slot> {
        self.available.get(id)
    }

    pub fn get_booked(&self, id: &SlotId) -> Option<&Appointment> {
        self.booked.get(id)
    }

    pub fn is_available(&self, id: &SlotId) -> bool {
        self.available.contains_key(id)
    }

    pub fn is_booked(&self, id: &SlotId) -> bool {
        self.booked.contains_key(id)
    }

    pub fn available_len(&self) -> usize {
        self.available.len()
    }

    pub fn booked_len(&self) -> usize {
        self.booked.len()
    }
}
