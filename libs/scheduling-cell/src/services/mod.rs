pub mod slots;
pub mod registry;
pub mod session;
pub mod controller;
pub mod recording;

pub use slots::{SlotGenerator, SlotWindow, Slots};
pub use registry::AppointmentRegistry;
pub use session::SessionContext;
pub use controller::{
    Clock, FixedClock, IntentOutcome, InteractionMode, SchedulingController, SchedulingView,
    SystemClock,
};
pub use recording::RecordingView;
