use std::rc::Rc;

use serde_json::Value;

use super::{Bus, Channel, Handler, PublisherId};
use crate::error::BusError;

/// An identity that issues notifications on the shared [`Bus`].
///
/// Dropping the publisher removes every subscription filed under it.
#[derive(Debug)]
pub struct Publisher {
    id: PublisherId,
    bus: Rc<Bus>,
}

impl Publisher {
    pub fn new(bus: Rc<Bus>) -> Self {
        Self {
            id: PublisherId::new(),
            bus,
        }
    }

    pub fn id(&self) -> PublisherId {
        self.id
    }

    pub fn bus(&self) -> &Rc<Bus> {
        &self.bus
    }

    pub fn subscribe(&self, channel: impl Into<Channel>, handler: &Handler, bound: Vec<Value>) {
        self.bus.subscribe(self.id, channel, handler, bound);
    }

    pub fn unsubscribe(&self, channel: impl Into<Channel>, handler: &Handler, bound: &[Value]) -> Result<(), BusError> {
        self.bus.unsubscribe(self.id, channel, handler, bound)
    }

    pub fn issue(&self, channel: &Channel, args: &[Value]) {
        self.bus.emit(self.id, channel, args);
    }

    pub fn has_subscribers(&self, channel: &Channel) -> bool {
        self.bus.has_channel_subscribers(self.id, channel)
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.bus.remove_publisher(self.id);
    }
}
