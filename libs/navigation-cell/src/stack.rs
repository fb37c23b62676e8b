// libs/navigation-cell/src/stack.rs
use tracing::{debug, info};

use crate::error::NavigationError;
use crate::frame::NavigationFrame;

/// LIFO history of screens the user can return to.
///
/// Every screen transition pushes the frame that redraws its caller and every
/// back action pops exactly one. Entries are never deduplicated, skipped or
/// reordered, and there is no capacity bound.
#[derive(Debug, Clone)]
pub struct NavigationStack<F = NavigationFrame> {
    frames: Vec<F>,
}

impl<F> Default for NavigationStack<F> {
    fn default() -> Self {
        Self { frames: Vec::new() }
    }
}

impl<F> NavigationStack<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: F) {
        self.frames.push(frame);
        debug!("Navigation frame pushed, depth {}", self.frames.len());
    }

    pub fn pop(&mut self) -> Result<F, NavigationError> {
        let frame = self.frames.pop().ok_or(NavigationError::EmptyStack)?;
        debug!("Navigation frame popped, depth {}", self.frames.len());
        Ok(frame)
    }

    /// Pop the most recent frame and hand it to `restore`.
    ///
    /// An empty stack is reported and leaves the caller where it is.
    pub fn go_back<R>(&mut self, restore: impl FnOnce(F) -> R) -> Result<R, NavigationError> {
        match self.pop() {
            Ok(frame) => Ok(restore(frame)),
            Err(e) => {
                info!("No previous frame to go back to");
                Err(e)
            }
        }
    }

    pub fn peek(&self) -> Option<&F> {
        self.frames.last()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
