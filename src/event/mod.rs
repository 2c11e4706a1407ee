mod bus;
mod channel;
mod publisher;
mod queue;

pub use bus::{Bus, Handler, handler};
pub use channel::*;
pub use publisher::Publisher;
pub use queue::{MAX_FLUSH_PASSES, QueueingPublisher};
