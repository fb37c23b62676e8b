pub mod error;
pub mod frame;
pub mod stack;

pub use error::NavigationError;
pub use frame::NavigationFrame;
pub use stack::NavigationStack;
