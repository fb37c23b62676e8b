// libs/scheduling-cell/src/services/slots.rs
use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::debug;

use shared_config::AppConfig;

use crate::models::{DoctorRef, SchedulingError, Slot, SlotId};

/// Daily window slots are cut from. Both endpoints are bookable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    start: NaiveTime,
    end: NaiveTime,
    interval_minutes: i64,
}

impl SlotWindow {
    pub fn new(start: NaiveTime, end: NaiveTime, interval_minutes: i64) -> Result<Self, SchedulingError> {
        if start > end {
            return Err(SchedulingError::InvalidSlotWindow(format!(
                "start {} is after end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        if interval_minutes <= 0 {
            return Err(SchedulingError::InvalidSlotWindow(format!(
                "interval must be positive, got {} minutes",
                interval_minutes
            )));
        }

        Ok(Self { start, end, interval_minutes })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn interval_minutes(&self) -> i64 {
        self.interval_minutes
    }

    /// Number of slots the window yields.
    pub fn slot_count(&self) -> usize {
        let span = (self.end - self.start).num_minutes();
        (span / self.interval_minutes) as usize + 1
    }
}

impl Default for SlotWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            interval_minutes: 15,
        }
    }
}

/// Produces the bookable slots of one doctor for one day.
#[derive(Debug, Clone)]
pub struct SlotGenerator {
    window: SlotWindow,
    location: String,
}

impl SlotGenerator {
    pub fn new(window: SlotWindow, location: impl Into<String>) -> Self {
        Self {
            window,
            location: location.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, SchedulingError> {
        let window = SlotWindow::new(config.day_start, config.day_end, config.slot_interval_minutes)?;
        Ok(Self::new(window, config.location.clone()))
    }

    pub fn window(&self) -> &SlotWindow {
        &self.window
    }

    /// Lazily yield the slots of `day`. Every call starts again from id 0.
    pub fn slots(&self, doctor: &DoctorRef, day: NaiveDate) -> Slots {
        Slots {
            doctor: doctor.clone(),
            day,
            location: self.location.clone(),
            window: self.window,
            next: 0,
            count: self.window.slot_count(),
        }
    }

    pub fn generate(&self, doctor: &DoctorRef, day: NaiveDate) -> Vec<Slot> {
        let slots: Vec<Slot> = self.slots(doctor, day).collect();
        debug!(
            "Generated {} slots for doctor '{}' on {}",
            slots.len(),
            doctor.identity,
            day
        );
        slots
    }
}

/// Finite iterator over one generation run.
#[derive(Debug, Clone)]
pub struct Slots {
    doctor: DoctorRef,
    day: NaiveDate,
    location: String,
    window: SlotWindow,
    next: usize,
    count: usize,
}

impl Iterator for Slots {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        if self.next >= self.count {
            return None;
        }

        // next * interval never exceeds end - start, so the addition cannot wrap past midnight
        let offset = Duration::minutes(self.next as i64 * self.window.interval_minutes);
        let slot = Slot {
            id: SlotId::from_sequence(self.next),
            doctor: self.doctor.clone(),
            date: self.day,
            time: self.window.start + offset,
            location: self.location.clone(),
        };
        self.next += 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Slots {}
