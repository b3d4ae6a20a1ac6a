pub mod handler;
pub mod swipe;

pub use handler::{InputHandler, KeyAction};
pub use swipe::{MIN_SWIPE_DISTANCE, SwipeDetector};
