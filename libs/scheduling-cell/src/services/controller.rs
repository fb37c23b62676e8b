// libs/scheduling-cell/src/services/controller.rs
use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use navigation_cell::{NavigationFrame, NavigationStack};
use shared_config::{AppConfig, DEFAULT_NOTICE_TTL_SECONDS};

use crate::models::{
    Dialog, DialogChoice, DialogKind, Notice, Operation, Role, RowTarget,
    ScheduleRow, SchedulingError, Screen, ScreenState, SlotId,
};
use crate::services::registry::AppointmentRegistry;
use crate::services::session::SessionContext;
use crate::services::slots::SlotGenerator;

/// Presentation layer callbacks. The controller never draws anything itself.
pub trait SchedulingView {
    /// Called after every state change with the full screen to draw.
    fn render(&mut self, state: &ScreenState);

    fn notify(&mut self, notice: &Notice);

    /// The scheduling window was left and `frame` is the caller to redraw.
    fn restore(&mut self, frame: &NavigationFrame);

    /// The scheduling window was left with no caller on the navigation stack.
    fn exit(&mut self);
}

pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Whether row activation is live or a dialog currently owns the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionMode {
    Selecting,
    Dialog(Dialog),
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    /// State changed and the view was redrawn.
    Rendered(Screen),
    /// Nothing to do, e.g. activating a heading.
    Ignored,
    /// The intent was refused; recoverable errors were also shown as a notice.
    Rejected(SchedulingError),
    /// The scheduling window is gone; `restored` is the caller that was redrawn.
    Closed { restored: Option<NavigationFrame> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GenerationKey {
    doctor: String,
    day: NaiveDate,
}

/// Drives one scheduling window: turns user intents into registry calls,
/// keeps the interaction mode and reports every change to the view.
pub struct SchedulingController<V, C = SystemClock> {
    registry: AppointmentRegistry,
    navigation: NavigationStack,
    generator: SlotGenerator,
    clock: C,
    view: V,
    notice_ttl_seconds: u64,
    session: Option<SessionContext>,
    screen: Screen,
    mode: InteractionMode,
    generation: Option<GenerationKey>,
}

impl<V: SchedulingView> SchedulingController<V, SystemClock> {
    pub fn from_config(config: &AppConfig, view: V) -> Result<Self, SchedulingError> {
        let generator = SlotGenerator::from_config(config)?;
        Ok(Self::new(generator, AppointmentRegistry::new(), SystemClock, view)
            .with_notice_ttl(config.notice_ttl_seconds))
    }
}

impl<V, C> SchedulingController<V, C> {
    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    pub fn registry(&self) -> &AppointmentRegistry {
        &self.registry
    }

    pub fn navigation(&self) -> &NavigationStack {
        &self.navigation
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn dialog(&self) -> Option<&Dialog> {
        match &self.mode {
            InteractionMode::Dialog(dialog) => Some(dialog),
            InteractionMode::Selecting => None,
        }
    }

    /// The screen as the view should currently draw it.
    pub fn screen_state(&self) -> ScreenState {
        let dialog = self.dialog().cloned();
        let armed = dialog.is_none();

        let Some(session) = self.session.as_ref() else {
            return ScreenState {
                screen: Screen::Closed,
                title: String::new(),
                counterpart_label: String::new(),
                rows: Vec::new(),
                empty_message: None,
                dialog: None,
                back_enabled: false,
                selection_armed: false,
            };
        };

        let (title, counterpart_label, rows, empty_message) = match self.screen {
            Screen::Start => (
                format!("Hello, {}!", session.display_name),
                String::new(),
                Vec::new(),
                None,
            ),
            Screen::Booking => {
                let rows: Vec<ScheduleRow> = self
                    .registry
                    .list_available()
                    .map(ScheduleRow::from_slot)
                    .collect();
                let empty = rows
                    .is_empty()
                    .then(|| "There are currently no appointments available for booking.".to_string());
                (
                    "List of appointments available for booking".to_string(),
                    "Doctor".to_string(),
                    rows,
                    empty,
                )
            }
            Screen::Managing => {
                let rows: Vec<ScheduleRow> = self
                    .registry
                    .list_booked()
                    .filter(|appointment| session.can_see(appointment))
                    .map(|appointment| ScheduleRow::from_appointment(appointment, session.role))
                    .collect();
                let (title, label, empty) = match session.role {
                    Role::Patient => (
                        "List of appointments booked by you",
                        "Doctor",
                        "There are currently no appointments booked by you.",
                    ),
                    Role::Doctor => (
                        "List of appointments to confirm or modify",
                        "Patient",
                        "There are currently no appointment requests.",
                    ),
                };
                let empty = rows.is_empty().then(|| empty.to_string());
                (title.to_string(), label.to_string(), rows, empty)
            }
            Screen::Closed => (String::new(), String::new(), Vec::new(), None),
        };

        ScreenState {
            screen: self.screen,
            title,
            counterpart_label,
            rows,
            empty_message,
            dialog,
            back_enabled: armed,
            selection_armed: armed && matches!(self.screen, Screen::Booking | Screen::Managing),
        }
    }
}

impl<V: SchedulingView, C: Clock> SchedulingController<V, C> {
    pub fn new(generator: SlotGenerator, registry: AppointmentRegistry, clock: C, view: V) -> Self {
        Self {
            registry,
            navigation: NavigationStack::new(),
            generator,
            clock,
            view,
            notice_ttl_seconds: DEFAULT_NOTICE_TTL_SECONDS,
            session: None,
            screen: Screen::Closed,
            mode: InteractionMode::Selecting,
            generation: None,
        }
    }

    /// Share a navigation history that role screens have already pushed onto.
    pub fn with_navigation(mut self, navigation: NavigationStack) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn with_notice_ttl(mut self, notice_ttl_seconds: u64) -> Self {
        self.notice_ttl_seconds = notice_ttl_seconds;
        self
    }

    /// Entry point from a patient or doctor home screen.
    ///
    /// Bookings made in an earlier session survive re-entry; the day's slots
    /// are only regenerated when the calendar doctor or the day changed.
    pub fn open(&mut self, session: SessionContext, return_frame: NavigationFrame) -> Result<(), SchedulingError> {
        if self.session.is_some() {
            warn!("Scheduling already open, refusing entry for '{}'", session.identity);
            return Err(SchedulingError::SessionActive);
        }

        info!(
            "Opening scheduling for '{}' ({}), returning to '{}'",
            session.identity, session.role, return_frame
        );

        self.navigation.push(return_frame);
        self.ensure_generation(&session);
        self.session = Some(session);
        self.screen = Screen::Start;
        self.mode = InteractionMode::Selecting;
        self.render();
        Ok(())
    }

    /// Leave the start screen for the booking or managing list.
    pub fn navigate(&mut self, to: Screen) -> IntentOutcome {
        let Some(session) = self.session.as_ref() else {
            return self.refuse(SchedulingError::NoSession);
        };
        if self.dialog().is_some() {
            return self.refuse(SchedulingError::DialogOpen);
        }

        let operation = match to {
            Screen::Booking => Operation::ViewAvailable,
            Screen::Managing => Operation::ViewBookings,
            Screen::Start | Screen::Closed => {
                return self.refuse(SchedulingError::InvalidNavigation { from: self.screen, to });
            }
        };
        if self.screen != Screen::Start {
            return self.refuse(SchedulingError::InvalidNavigation { from: self.screen, to });
        }

        if let Err(e) = session.authorize(operation) {
            return self.recover(e);
        }

        debug!("Scheduling screen {} -> {}", self.screen, to);
        self.screen = to;
        self.render();
        IntentOutcome::Rendered(to)
    }

    /// Double-activation on the current list.
    ///
    /// Headings, separators and empty space never open a dialog. While a
    /// dialog is open activations are dropped until it ends.
    pub fn activate(&mut self, target: RowTarget) -> IntentOutcome {
        if self.session.is_none() {
            return self.refuse(SchedulingError::NoSession);
        }
        if !matches!(self.screen, Screen::Booking | Screen::Managing) {
            return IntentOutcome::Ignored;
        }
        if self.dialog().is_some() {
            debug!("Row activation ignored while a dialog is open");
            return IntentOutcome::Ignored;
        }

        let id = match target {
            RowTarget::Row(id) => id,
            RowTarget::Heading | RowTarget::Separator | RowTarget::Nothing => {
                debug!("Activation on {:?} is not a row, ignoring", target);
                return IntentOutcome::Ignored;
            }
        };

        let dialog = match self.screen {
            Screen::Booking => self.booking_dialog(&id),
            _ => self.managing_dialog(&id),
        };

        match dialog {
            Ok(dialog) => {
                debug!("Opened {:?} dialog for {}", dialog.kind, id);
                self.mode = InteractionMode::Dialog(dialog);
                self.render();
                IntentOutcome::Rendered(self.screen)
            }
            Err(e) => self.recover(e),
        }
    }

    /// Pick one of the options of the open dialog.
    ///
    /// Whatever happens, a dialog that accepted the choice is closed and row
    /// selection is armed again.
    pub fn choose(&mut self, choice: DialogChoice) -> IntentOutcome {
        let Some(dialog) = self.dialog() else {
            return self.refuse(SchedulingError::NoDialog);
        };
        if !dialog.offers(choice) {
            return self.refuse(SchedulingError::ChoiceNotOffered(choice));
        }
        let id = dialog.slot_id().clone();

        let result = match choice {
            DialogChoice::Cancel => Ok(None),
            DialogChoice::Book => self.commit_book(&id).map(Some),
            DialogChoice::Confirm => self.commit_confirmation(&id, Operation::Confirm).map(Some),
            DialogChoice::Unconfirm => self.commit_confirmation(&id, Operation::Unconfirm).map(Some),
            DialogChoice::Delete => self.commit_release(&id).map(Some),
        };

        self.mode = InteractionMode::Selecting;
        let outcome = match result {
            Ok(Some(message)) => {
                let notice = Notice::info(message, self.notice_ttl_seconds);
                self.view.notify(&notice);
                IntentOutcome::Rendered(self.screen)
            }
            Ok(None) => {
                debug!("Dialog for {} cancelled", id);
                IntentOutcome::Rendered(self.screen)
            }
            Err(e) => self.recover(e),
        };
        self.render();
        outcome
    }

    /// The dialog window was closed without choosing anything.
    pub fn dismiss_dialog(&mut self) -> IntentOutcome {
        if self.dialog().is_none() {
            return IntentOutcome::Ignored;
        }
        debug!("Dialog dismissed");
        self.mode = InteractionMode::Selecting;
        self.render();
        IntentOutcome::Rendered(self.screen)
    }

    /// The screen's back control.
    pub fn back(&mut self) -> IntentOutcome {
        if self.session.is_none() {
            return self.refuse(SchedulingError::NoSession);
        }
        if self.dialog().is_some() {
            return self.refuse(SchedulingError::DialogOpen);
        }

        match self.screen {
            Screen::Booking | Screen::Managing => {
                debug!("Scheduling screen {} -> start", self.screen);
                self.screen = Screen::Start;
                self.render();
                IntentOutcome::Rendered(Screen::Start)
            }
            Screen::Start | Screen::Closed => self.leave(),
        }
    }

    /// The scheduling window itself was closed.
    pub fn close(&mut self) -> IntentOutcome {
        if self.session.is_none() {
            return self.refuse(SchedulingError::NoSession);
        }
        if self.dialog().is_some() {
            debug!("Closing scheduling with a dialog open, dismissing it");
        }
        self.leave()
    }

    fn leave(&mut self) -> IntentOutcome {
        self.mode = InteractionMode::Selecting;
        self.screen = Screen::Closed;
        if let Some(session) = self.session.take() {
            info!("Closing scheduling for '{}'", session.identity);
        }

        let view = &mut self.view;
        match self.navigation.go_back(|frame| {
            view.restore(&frame);
            frame
        }) {
            Ok(frame) => IntentOutcome::Closed { restored: Some(frame) },
            Err(e) => {
                debug!("{}, leaving scheduling", SchedulingError::from(e));
                self.view.exit();
                IntentOutcome::Closed { restored: None }
            }
        }
    }

    fn ensure_generation(&mut self, session: &SessionContext) {
        let doctor = session.calendar_doctor();
        let key = GenerationKey {
            doctor: doctor.identity.clone(),
            day: self.clock.today(),
        };

        if self.generation.as_ref() == Some(&key) {
            debug!("Reusing slots of doctor '{}' for {}", key.doctor, key.day);
            return;
        }

        let slots = self.generator.slots(&doctor, key.day);
        self.registry.load_generation(slots);
        self.generation = Some(key);
    }

    fn booking_dialog(&self, id: &SlotId) -> Result<Dialog, SchedulingError> {
        let slot = self
            .registry
            .get_available(id)
            .ok_or_else(|| SchedulingError::NotFound(id.clone()))?;

        Ok(Dialog {
            kind: DialogKind::BookSlot,
            title: "Appointment booking".to_string(),
            prompt: "Do you want to book this appointment?".to_string(),
            row: ScheduleRow::from_slot(slot),
            options: vec![DialogChoice::Book, DialogChoice::Cancel],
        })
    }

    fn managing_dialog(&self, id: &SlotId) -> Result<Dialog, SchedulingError> {
        let session = self.session.as_ref().ok_or(SchedulingError::NoSession)?;
        let appointment = self
            .registry
            .get_booked(id)
            .filter(|appointment| session.can_see(appointment))
            .ok_or_else(|| SchedulingError::NotFound(id.clone()))?;

        let (prompt, options) = match session.role {
            Role::Doctor => (
                "Apply modifications to this appointment:",
                vec![DialogChoice::Confirm, DialogChoice::Unconfirm, DialogChoice::Cancel],
            ),
            Role::Patient => (
                "Do you want to delete this appointment?",
                vec![DialogChoice::Delete, DialogChoice::Cancel],
            ),
        };

        Ok(Dialog {
            kind: DialogKind::ManageBooking,
            title: "Booked appointment modification".to_string(),
            prompt: prompt.to_string(),
            row: ScheduleRow::from_appointment(appointment, session.role),
            options,
        })
    }

    fn commit_book(&mut self, id: &SlotId) -> Result<String, SchedulingError> {
        let session = self.session.as_ref().ok_or(SchedulingError::NoSession)?;
        session.authorize(Operation::Book)?;

        let appointment = self.registry.book(id, session.person())?;
        info!("Appointment {} booked by '{}'", id, session.identity);

        Ok(format!(
            "Appointment {} booked successfully. Now, wait upon a doctor confirmation.",
            appointment.slot
        ))
    }

    fn commit_confirmation(&mut self, id: &SlotId, operation: Operation) -> Result<String, SchedulingError> {
        let session = self.session.as_ref().ok_or(SchedulingError::NoSession)?;
        let appointment = self
            .registry
            .get_booked(id)
            .ok_or_else(|| SchedulingError::NotFound(id.clone()))?;
        session.authorize_on(operation, appointment)?;

        let (appointment, verb) = if operation == Operation::Confirm {
            (self.registry.confirm(id)?, "confirmed")
        } else {
            (self.registry.unconfirm(id)?, "unconfirmed")
        };
        info!("Appointment {} {} by '{}'", id, verb, session.identity);

        Ok(format!("Appointment {} {} successfully.", appointment.slot, verb))
    }

    fn commit_release(&mut self, id: &SlotId) -> Result<String, SchedulingError> {
        let session = self.session.as_ref().ok_or(SchedulingError::NoSession)?;
        let appointment = self
            .registry
            .get_booked(id)
            .ok_or_else(|| SchedulingError::NotFound(id.clone()))?;
        session.authorize_on(Operation::Release, appointment)?;

        let slot = self.registry.release(id)?;
        info!("Appointment {} deleted by '{}'", id, session.identity);

        Ok(format!(
            "Appointment {} deleted successfully. Now, it is again available for booking.",
            slot
        ))
    }

    fn render(&mut self) {
        let state = self.screen_state();
        self.view.render(&state);
    }

    /// Recoverable failure: shown to the user, never propagated.
    fn recover(&mut self, err: SchedulingError) -> IntentOutcome {
        warn!("Scheduling operation rejected: {}", err);
        let notice = Notice::error(err.to_string(), self.notice_ttl_seconds);
        self.view.notify(&notice);
        IntentOutcome::Rejected(err)
    }

    /// Intent that the current interaction mode does not accept.
    fn refuse(&self, err: SchedulingError) -> IntentOutcome {
        debug!("Intent refused: {}", err);
        IntentOutcome::Rejected(err)
    }
}
