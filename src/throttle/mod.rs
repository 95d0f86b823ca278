//! Reply throttling logic and state management.

mod clock;
mod key;
mod request;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::ThrottleKey;
pub use request::{is_channel_target, RequestThrottle, ThrottleState, DEFAULT_CHANTYPES};
