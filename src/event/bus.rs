use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use serde_json::Value;

use super::{Channel, PublisherKey};
use crate::error::{BoxError, BusError};

/// Callback invoked for every matching notification. It receives the
/// emitted arguments followed by the arguments bound at subscription time.
pub type Handler = Rc<dyn Fn(&[Value]) -> Result<(), BoxError>>;

/// Wraps a closure into a [`Handler`]. Keep the returned value around: the
/// same `Rc` is needed to unsubscribe.
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&[Value]) -> Result<(), BoxError> + 'static,
{
    Rc::new(f)
}

#[derive(Clone)]
struct Receiver {
    handler: Handler,
    bound: Vec<Value>,
}

impl Receiver {
    fn matches(&self, handler: &Handler, bound: &[Value]) -> bool {
        Rc::ptr_eq(&self.handler, handler) && self.bound == bound
    }
}

type Channels = HashMap<Channel, Vec<Receiver>>;

/// Publish/subscribe registry keyed by (publisher, channel).
///
/// One instance is created by the application root and shared through an
/// `Rc`. All methods take `&self` so handlers may call back into the bus
/// while a notification is being delivered.
pub struct Bus {
    connections: RefCell<HashMap<PublisherKey, Channels>>,
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let connections = self.connections.borrow();
        let receivers: usize = connections
            .values()
            .flat_map(|channels| channels.values())
            .map(Vec::len)
            .sum();
        f.debug_struct("Bus")
            .field("publishers", &connections.len())
            .field("receivers", &receivers)
            .finish()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            connections: RefCell::new(HashMap::new()),
        }
    }

    /// Registers `handler` for `channel` on `publisher`.
    ///
    /// Subscribing an identical (publisher, channel, handler, bound) tuple a
    /// second time does not duplicate it; the existing entry moves to the end
    /// of the delivery order instead.
    pub fn subscribe(
        &self,
        publisher: impl Into<PublisherKey>,
        channel: impl Into<Channel>,
        handler: &Handler,
        bound: Vec<Value>,
    ) {
        let mut connections = self.connections.borrow_mut();
        let receivers = connections
            .entry(publisher.into())
            .or_default()
            .entry(channel.into())
            .or_default();
        receivers.retain(|receiver| !receiver.matches(handler, &bound));
        receivers.push(Receiver {
            handler: Rc::clone(handler),
            bound,
        });
    }

    /// Subscribes to a topic that is not tied to any publisher.
    pub fn subscribe_global(&self, channel: impl Into<Channel>, handler: &Handler, bound: Vec<Value>) {
        self.subscribe(PublisherKey::Global, channel, handler, bound);
    }

    /// Removes exactly the tuple registered by [`Bus::subscribe`].
    pub fn unsubscribe(
        &self,
        publisher: impl Into<PublisherKey>,
        channel: impl Into<Channel>,
        handler: &Handler,
        bound: &[Value],
    ) -> Result<(), BusError> {
        let publisher = publisher.into();
        let channel = channel.into();
        let mut connections = self.connections.borrow_mut();

        let Some(channels) = connections.get_mut(&publisher) else {
            return Err(BusError::NotSubscribed { publisher, channel });
        };
        let Some(receivers) = channels.get_mut(&channel) else {
            return Err(BusError::NotSubscribed { publisher, channel });
        };
        let Some(index) = receivers.iter().position(|r| r.matches(handler, bound)) else {
            return Err(BusError::NotSubscribed { publisher, channel });
        };
        let removed = receivers.remove(index);

        if receivers.is_empty() {
            channels.remove(&channel);
            if channels.is_empty() {
                connections.remove(&publisher);
            }
        }
        // Dropping a receiver may drop a publisher that calls back into the bus
        drop(connections);
        drop(removed);
        Ok(())
    }

    /// Delivers `args` to every receiver of (`publisher`, `channel`) in
    /// registration order.
    ///
    /// The receiver list is snapshotted first, so handlers may subscribe or
    /// unsubscribe while the notification is delivered. A handler that fails
    /// or panics is logged and the remaining receivers are still called.
    pub fn emit(&self, publisher: impl Into<PublisherKey>, channel: &Channel, args: &[Value]) {
        let publisher = publisher.into();
        let receivers = {
            let connections = self.connections.borrow();
            match connections.get(&publisher).and_then(|channels| channels.get(channel)) {
                Some(receivers) => receivers.clone(),
                None => return,
            }
        };

        for receiver in receivers {
            let mut call_args = Vec::with_capacity(args.len() + receiver.bound.len());
            call_args.extend_from_slice(args);
            call_args.extend_from_slice(&receiver.bound);

            match panic::catch_unwind(AssertUnwindSafe(|| (receiver.handler)(&call_args))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    log::error!(target: "internal", "{publisher}.{channel}: handler{:?} failed: {err}", receiver.bound);
                }
                Err(_) => {
                    log::error!(target: "internal", "{publisher}.{channel}: handler{:?} panicked", receiver.bound);
                }
            }
        }
    }

    /// Drops every subscription filed under `publisher` in one step.
    ///
    /// Safe to call while the publisher is being torn down: it never fails.
    pub fn remove_publisher(&self, publisher: impl Into<PublisherKey>) {
        let publisher = publisher.into();
        if let Ok(mut connections) = self.connections.try_borrow_mut() {
            let removed = connections.remove(&publisher);
            // Release the table before the receivers go: their handlers may
            // own publishers whose teardown removes them from this bus too
            drop(connections);
            drop(removed);
        } else {
            log::error!(target: "internal", "remove_publisher({publisher}) while the bus is locked");
        }
    }

    /// True if anything is subscribed to any channel of `publisher`.
    pub fn has_subscribers(&self, publisher: impl Into<PublisherKey>) -> bool {
        self.connections.borrow().contains_key(&publisher.into())
    }

    pub fn has_channel_subscribers(&self, publisher: impl Into<PublisherKey>, channel: &Channel) -> bool {
        self.connections
            .borrow()
            .get(&publisher.into())
            .is_some_and(|channels| channels.contains_key(channel))
    }

    /// Number of receivers for (`publisher`, `channel`).
    pub fn receiver_count(&self, publisher: impl Into<PublisherKey>, channel: &Channel) -> usize {
        self.connections
            .borrow()
            .get(&publisher.into())
            .and_then(|channels| channels.get(channel))
            .map_or(0, Vec::len)
    }
}
