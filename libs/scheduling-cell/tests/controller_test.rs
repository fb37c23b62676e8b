// libs/scheduling-cell/tests/controller_test.rs

use assert_matches::assert_matches;
use chrono::NaiveDate;

use navigation_cell::{NavigationFrame, NavigationStack};
use scheduling_cell::models::{
    DialogChoice, DialogKind, NoticeLevel, Operation, PersonRef, Role, RowTarget,
    SchedulingError, Screen, SlotId,
};
use scheduling_cell::services::{
    AppointmentRegistry, FixedClock, IntentOutcome, InteractionMode, RecordingView,
    SchedulingController, SessionContext, SlotGenerator,
};
use shared_config::AppConfig;

// ==============================================================================
// TEST FIXTURES
// ==============================================================================

type Desk = SchedulingController<RecordingView, FixedClock>;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 3).unwrap()
}

fn desk() -> Desk {
    let generator = SlotGenerator::from_config(&AppConfig::default()).unwrap();
    SchedulingController::new(
        generator,
        AppointmentRegistry::new(),
        FixedClock(day()),
        RecordingView::new(),
    )
}

fn doctor_ref() -> PersonRef {
    PersonRef::new("doc-1", "Jack Strong")
}

fn patient_session() -> SessionContext {
    SessionContext::patient("pat-1", "John Smith", Some(doctor_ref()))
}

fn other_patient_session() -> SessionContext {
    SessionContext::patient("pat-2", "Ann Lee", Some(doctor_ref()))
}

fn doctor_session() -> SessionContext {
    SessionContext::doctor("doc-1", "Jack Strong")
}

fn home(screen: &str) -> NavigationFrame {
    NavigationFrame::new(screen).with_argument("user_id", 2)
}

fn row(id: &str) -> RowTarget {
    RowTarget::Row(SlotId::from(id))
}

fn book_as_patient(desk: &mut Desk, id: &str) {
    desk.navigate(Screen::Booking);
    desk.activate(row(id));
    assert_eq!(desk.choose(DialogChoice::Book), IntentOutcome::Rendered(Screen::Booking));
}

// ==============================================================================
// ENTRY & NAVIGATION
// ==============================================================================

#[test]
fn test_open_renders_start_and_pushes_return_frame() {
    let mut desk = desk();

    desk.open(patient_session(), home("patient_home")).unwrap();

    assert_eq!(desk.screen(), Screen::Start);
    assert_eq!(desk.navigation().len(), 1);
    let state = desk.view().last_render().unwrap();
    assert_eq!(state.screen, Screen::Start);
    assert_eq!(state.title, "Hello, John Smith!");
    assert!(state.back_enabled);
    assert_eq!(desk.registry().available_len(), 33);
}

#[test]
fn test_open_twice_is_rejected() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();

    assert_matches!(
        desk.open(doctor_session(), home("doctor_home")),
        Err(SchedulingError::SessionActive)
    );
    assert_eq!(desk.navigation().len(), 1);
    assert_eq!(desk.session().unwrap().role, Role::Patient);
}

#[test]
fn test_patient_views_booking_list() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();

    assert_eq!(desk.navigate(Screen::Booking), IntentOutcome::Rendered(Screen::Booking));

    let state = desk.view().last_render().unwrap();
    assert_eq!(state.title, "List of appointments available for booking");
    assert_eq!(state.counterpart_label, "Doctor");
    assert_eq!(state.rows.len(), 33);
    assert_eq!(state.rows[0].counterpart, "Jack Strong");
    assert_eq!(state.rows[0].date, "03-12-2024");
    assert_eq!(state.rows[0].location, "Einsteinweg 55 - Leiden");
    assert!(state.selection_armed);
}

#[test]
fn test_doctor_cannot_open_booking_list() {
    let mut desk = desk();
    desk.open(doctor_session(), home("doctor_home")).unwrap();

    let outcome = desk.navigate(Screen::Booking);

    assert_eq!(
        outcome,
        IntentOutcome::Rejected(SchedulingError::Unauthorized {
            role: Role::Doctor,
            operation: Operation::ViewAvailable,
        })
    );
    assert_eq!(desk.screen(), Screen::Start);
    let notice = desk.view().notices().last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.ttl_seconds, 10);
}

#[test]
fn test_navigate_only_from_start() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    desk.navigate(Screen::Booking);

    assert_matches!(
        desk.navigate(Screen::Managing),
        IntentOutcome::Rejected(SchedulingError::InvalidNavigation { from: Screen::Booking, to: Screen::Managing })
    );
}

#[test]
fn test_intents_without_session_are_rejected() {
    let mut desk = desk();

    assert_eq!(desk.back(), IntentOutcome::Rejected(SchedulingError::NoSession));
    assert_eq!(desk.navigate(Screen::Booking), IntentOutcome::Rejected(SchedulingError::NoSession));
    assert_eq!(desk.activate(row("0001")), IntentOutcome::Rejected(SchedulingError::NoSession));
    assert_eq!(desk.view().render_count(), 0);
}

// ==============================================================================
// ROW ACTIVATION & DIALOGS
// ==============================================================================

#[test]
fn test_heading_and_empty_space_are_no_ops() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    desk.navigate(Screen::Booking);
    let renders = desk.view().render_count();

    for target in [RowTarget::Heading, RowTarget::Nothing, RowTarget::Separator] {
        assert_eq!(desk.activate(target), IntentOutcome::Ignored);
    }

    assert_eq!(desk.view().render_count(), renders);
    assert_eq!(desk.mode(), &InteractionMode::Selecting);
    let state = desk.view().last_render().unwrap();
    assert!(state.back_enabled);
    assert!(state.selection_armed);
}

#[test]
fn test_booking_dialog_offers_book_and_cancel() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    desk.navigate(Screen::Booking);

    desk.activate(row("0005"));

    let state = desk.view().last_render().unwrap();
    let dialog = state.dialog.as_ref().unwrap();
    assert_eq!(dialog.kind, DialogKind::BookSlot);
    assert_eq!(dialog.row.time, "10:15");
    assert_eq!(dialog.options, vec![DialogChoice::Book, DialogChoice::Cancel]);
    assert!(!state.back_enabled);
    assert!(!state.selection_armed);
}

#[test]
fn test_activation_ignored_while_dialog_open() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    desk.navigate(Screen::Booking);
    desk.activate(row("0005"));

    assert_eq!(desk.activate(row("0006")), IntentOutcome::Ignored);
    assert_eq!(desk.back(), IntentOutcome::Rejected(SchedulingError::DialogOpen));

    let dialog = desk.view().last_render().unwrap().dialog.clone().unwrap();
    assert_eq!(dialog.row.id.as_str(), "0005");
}

#[test]
fn test_cancel_rearms_selection() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    desk.navigate(Screen::Booking);
    desk.activate(row("0005"));

    assert_eq!(desk.choose(DialogChoice::Cancel), IntentOutcome::Rendered(Screen::Booking));

    let state = desk.view().last_render().unwrap();
    assert!(state.dialog.is_none());
    assert!(state.selection_armed);
    assert_eq!(state.rows.len(), 33);
    assert_eq!(desk.activate(row("0006")), IntentOutcome::Rendered(Screen::Booking));
}

#[test]
fn test_dismissing_dialog_rearms_selection() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    desk.navigate(Screen::Booking);
    desk.activate(row("0005"));

    assert_eq!(desk.dismiss_dialog(), IntentOutcome::Rendered(Screen::Booking));
    assert_eq!(desk.dismiss_dialog(), IntentOutcome::Ignored);
    assert_eq!(desk.activate(row("0005")), IntentOutcome::Rendered(Screen::Booking));
}

#[test]
fn test_choice_not_offered_keeps_dialog_open() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    desk.navigate(Screen::Booking);
    desk.activate(row("0005"));

    assert_eq!(
        desk.choose(DialogChoice::Confirm),
        IntentOutcome::Rejected(SchedulingError::ChoiceNotOffered(DialogChoice::Confirm))
    );
    assert_matches!(desk.mode(), InteractionMode::Dialog(_));
    assert!(!desk.registry().is_booked(&SlotId::from("0005")));
}

#[test]
fn test_choose_without_dialog() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    desk.navigate(Screen::Booking);

    assert_eq!(desk.choose(DialogChoice::Book), IntentOutcome::Rejected(SchedulingError::NoDialog));
}

// ==============================================================================
// BOOKING FLOWS
// ==============================================================================

#[test]
fn test_patient_books_slot() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();

    book_as_patient(&mut desk, "0005");

    let state = desk.view().last_render().unwrap();
    assert_eq!(state.rows.len(), 32);
    assert!(state.rows.iter().all(|r| r.id.as_str() != "0005"));
    assert!(state.selection_armed);

    let appointment = desk.registry().get_booked(&SlotId::from("0005")).unwrap();
    assert!(!appointment.confirmed);
    assert_eq!(appointment.patient.identity, "pat-1");

    let notice = desk.view().notices().last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Info);
    assert!(notice.message.contains("booked successfully"));
}

#[test]
fn test_stale_row_reports_not_found() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    book_as_patient(&mut desk, "0005");

    let outcome = desk.activate(row("0005"));

    assert_eq!(outcome, IntentOutcome::Rejected(SchedulingError::NotFound(SlotId::from("0005"))));
    assert_eq!(desk.mode(), &InteractionMode::Selecting);
    assert_eq!(desk.view().notices().last().unwrap().message, "Appointment 0005 not found");
}

#[test]
fn test_patient_manages_only_own_bookings() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    book_as_patient(&mut desk, "0001");
    desk.back();
    desk.back();

    desk.open(other_patient_session(), home("patient_home")).unwrap();
    book_as_patient(&mut desk, "0002");
    desk.back();
    desk.navigate(Screen::Managing);

    let state = desk.view().last_render().unwrap();
    assert_eq!(state.title, "List of appointments booked by you");
    assert_eq!(state.rows.len(), 1);
    assert_eq!(state.rows[0].id.as_str(), "0002");
    assert_eq!(state.rows[0].confirmed, Some(false));

    // someone else's booking is not reachable from this screen
    assert_matches!(desk.activate(row("0001")), IntentOutcome::Rejected(SchedulingError::NotFound(_)));
}

#[test]
fn test_patient_deletes_booking() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    book_as_patient(&mut desk, "0007");
    desk.back();
    desk.navigate(Screen::Managing);

    desk.activate(row("0007"));
    let dialog = desk.view().last_render().unwrap().dialog.clone().unwrap();
    assert_eq!(dialog.kind, DialogKind::ManageBooking);
    assert_eq!(dialog.options, vec![DialogChoice::Delete, DialogChoice::Cancel]);

    assert_eq!(desk.choose(DialogChoice::Delete), IntentOutcome::Rendered(Screen::Managing));

    let state = desk.view().last_render().unwrap();
    assert!(state.rows.is_empty());
    assert_eq!(
        state.empty_message.as_deref(),
        Some("There are currently no appointments booked by you.")
    );
    assert!(desk.registry().is_available(&SlotId::from("0007")));
    assert!(desk.view().notices().last().unwrap().message.contains("again available for booking"));
}

#[test]
fn test_doctor_confirms_and_unconfirms() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    book_as_patient(&mut desk, "0005");
    desk.close();

    desk.open(doctor_session(), home("doctor_home")).unwrap();
    desk.navigate(Screen::Managing);
    let state = desk.view().last_render().unwrap();
    assert_eq!(state.title, "List of appointments to confirm or modify");
    assert_eq!(state.counterpart_label, "Patient");
    assert_eq!(state.rows[0].counterpart, "John Smith");

    desk.activate(row("0005"));
    let dialog = desk.view().last_render().unwrap().dialog.clone().unwrap();
    assert_eq!(
        dialog.options,
        vec![DialogChoice::Confirm, DialogChoice::Unconfirm, DialogChoice::Cancel]
    );
    desk.choose(DialogChoice::Confirm);
    assert!(desk.registry().get_booked(&SlotId::from("0005")).unwrap().confirmed);
    assert_eq!(desk.view().last_render().unwrap().rows[0].confirmed, Some(true));

    desk.activate(row("0005"));
    desk.choose(DialogChoice::Confirm);
    assert!(desk.registry().get_booked(&SlotId::from("0005")).unwrap().confirmed);

    desk.activate(row("0005"));
    desk.choose(DialogChoice::Unconfirm);
    assert!(!desk.registry().get_booked(&SlotId::from("0005")).unwrap().confirmed);
    assert_eq!(desk.screen(), Screen::Managing);
}

#[test]
fn test_doctor_sees_only_own_calendar() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    book_as_patient(&mut desk, "0005");
    desk.close();

    desk.open(SessionContext::doctor("doc-2", "Eva Green"), home("doctor_home")).unwrap();
    desk.navigate(Screen::Managing);

    let state = desk.view().last_render().unwrap();
    assert!(state.rows.is_empty());
    assert_eq!(state.empty_message.as_deref(), Some("There are currently no appointment requests."));
    assert_matches!(desk.activate(row("0005")), IntentOutcome::Rejected(SchedulingError::NotFound(_)));
}

// ==============================================================================
// LEAVING & RE-ENTRY
// ==============================================================================

#[test]
fn test_back_from_list_returns_to_start() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    desk.navigate(Screen::Managing);

    assert_eq!(desk.back(), IntentOutcome::Rendered(Screen::Start));
    assert_eq!(desk.navigation().len(), 1);
}

#[test]
fn test_back_from_start_restores_caller() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();

    let outcome = desk.back();

    assert_eq!(outcome, IntentOutcome::Closed { restored: Some(home("patient_home")) });
    assert_eq!(desk.screen(), Screen::Closed);
    assert!(desk.session().is_none());
    assert!(desk.navigation().is_empty());
    assert_eq!(desk.view_mut().take_restored(), Some(home("patient_home")));
    assert!(!desk.view_mut().take_exited());
}

#[test]
fn test_leaving_keeps_earlier_history() {
    let mut stack = NavigationStack::new();
    stack.push(NavigationFrame::new("login"));
    let mut desk = desk().with_navigation(stack);
    desk.open(patient_session(), home("patient_home")).unwrap();
    assert_eq!(desk.navigation().len(), 2);

    assert_eq!(desk.back(), IntentOutcome::Closed { restored: Some(home("patient_home")) });
    assert_eq!(desk.navigation().len(), 1);
    assert_eq!(desk.navigation().peek(), Some(&NavigationFrame::new("login")));
}

#[test]
fn test_each_entry_pushes_one_frame() {
    let mut desk = desk();
    for _ in 0..3 {
        desk.open(patient_session(), home("patient_home")).unwrap();
        assert_eq!(desk.navigation().len(), 1);
        desk.navigate(Screen::Managing);
        desk.back();
        desk.back();
        assert!(desk.navigation().is_empty());
    }
}

#[test]
fn test_close_with_dialog_open() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    desk.navigate(Screen::Booking);
    desk.activate(row("0005"));

    assert_eq!(desk.close(), IntentOutcome::Closed { restored: Some(home("patient_home")) });
    assert_eq!(desk.mode(), &InteractionMode::Selecting);
    assert!(!desk.registry().is_booked(&SlotId::from("0005")));

    desk.open(patient_session(), home("patient_home")).unwrap();
    desk.navigate(Screen::Booking);
    assert_eq!(desk.activate(row("0005")), IntentOutcome::Rendered(Screen::Booking));
}

#[test]
fn test_reentry_keeps_bookings() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    book_as_patient(&mut desk, "0003");
    desk.close();

    desk.open(patient_session(), home("patient_home")).unwrap();
    desk.navigate(Screen::Booking);

    assert!(desk.registry().is_booked(&SlotId::from("0003")));
    assert_eq!(desk.view().last_render().unwrap().rows.len(), 32);
}

#[test]
fn test_new_calendar_withholds_colliding_ids() {
    let mut desk = desk();
    desk.open(patient_session(), home("patient_home")).unwrap();
    book_as_patient(&mut desk, "0003");
    desk.close();

    let other_doctor = PersonRef::new("doc-2", "Eva Green");
    desk.open(SessionContext::patient("pat-3", "Tom Bakker", Some(other_doctor)), home("patient_home"))
        .unwrap();
    desk.navigate(Screen::Booking);

    let state = desk.view().last_render().unwrap();
    assert_eq!(state.rows.len(), 32);
    assert!(state.rows.iter().all(|r| r.counterpart == "Eva Green"));
    assert!(desk.registry().is_booked(&SlotId::from("0003")));
}
