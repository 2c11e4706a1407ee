use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;

use super::{Bus, Channel, Handler, Publisher, PublisherId, PublisherKey};
use crate::error::BusError;

/// Upper bound on drain passes in [`QueueingPublisher::flush_message_queue`].
pub const MAX_FLUSH_PASSES: usize = 16;

/// A publisher that coalesces notifications issued inside a transaction.
///
/// While a transaction is open, [`issue`](Self::issue) only queues the
/// message. A channel queued twice is delivered once, with the most recent
/// arguments, at the position of the latest call. The queue is flushed when
/// the outermost transaction ends.
#[derive(Debug)]
pub struct QueueingPublisher {
    publisher: Publisher,
    queue: RefCell<Vec<(Channel, Vec<Value>)>>,
    depth: Cell<usize>,
    flushing: Cell<bool>,
}

impl QueueingPublisher {
    pub fn new(bus: Rc<Bus>) -> Self {
        Self {
            publisher: Publisher::new(bus),
            queue: RefCell::new(Vec::new()),
            depth: Cell::new(0),
            flushing: Cell::new(false),
        }
    }

    pub fn id(&self) -> PublisherId {
        self.publisher.id()
    }

    pub fn bus(&self) -> &Rc<Bus> {
        self.publisher.bus()
    }

    pub fn subscribe(&self, channel: impl Into<Channel>, handler: &Handler, bound: Vec<Value>) {
        self.publisher.subscribe(channel, handler, bound);
    }

    pub fn unsubscribe(&self, channel: impl Into<Channel>, handler: &Handler, bound: &[Value]) -> Result<(), BusError> {
        self.publisher.unsubscribe(channel, handler, bound)
    }

    /// Emits immediately outside a transaction, queues inside one.
    pub fn issue(&self, channel: &Channel, args: &[Value]) {
        if self.depth.get() > 0 || self.flushing.get() {
            self.queue_message(channel.clone(), args.to_vec());
        } else {
            self.publisher.issue(channel, args);
        }
    }

    pub fn queue_message(&self, channel: Channel, args: Vec<Value>) {
        let mut queue = self.queue.borrow_mut();
        queue.retain(|(queued, _)| *queued != channel);
        queue.push((channel, args));
    }

    pub fn pending(&self) -> Vec<Channel> {
        self.queue.borrow().iter().map(|(channel, _)| channel.clone()).collect()
    }

    pub fn clear_message_queue(&self) {
        self.queue.borrow_mut().clear();
    }

    /// Delivers every queued message, including messages queued by the
    /// handlers themselves, before returning.
    ///
    /// Gives up after [`MAX_FLUSH_PASSES`] passes: the remaining queue is
    /// dropped and `FlushOverflow` is returned.
    pub fn flush_message_queue(&self) -> Result<(), BusError> {
        if self.flushing.replace(true) {
            // Already draining further up the stack; that loop picks up
            // whatever is queued now.
            return Ok(());
        }

        let mut passes = 0;
        let result = loop {
            let queue = std::mem::take(&mut *self.queue.borrow_mut());
            if queue.is_empty() {
                break Ok(());
            }
            if passes == MAX_FLUSH_PASSES {
                log::error!(
                    target: "internal",
                    "{}: dropping {} queued message(s) after {passes} flush passes",
                    self.id(),
                    queue.len()
                );
                break Err(BusError::FlushOverflow {
                    publisher: PublisherKey::Object(self.id()),
                    passes,
                });
            }
            passes += 1;
            for (channel, args) in queue {
                self.publisher.issue(&channel, &args);
            }
        };

        self.flushing.set(false);
        result
    }

    pub fn begin_transaction(&self) {
        self.depth.set(self.depth.get() + 1);
    }

    /// Closes one level of transaction. The outermost close flushes.
    pub fn end_transaction(&self) -> Result<(), BusError> {
        match self.depth.get() {
            0 => Err(BusError::TransactionUnderflow(PublisherKey::Object(self.id()))),
            1 => {
                self.depth.set(0);
                self.flush_message_queue()
            }
            depth => {
                self.depth.set(depth - 1);
                Ok(())
            }
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.depth.get() > 0
    }

    pub fn transaction_depth(&self) -> usize {
        self.depth.get()
    }

    /// Runs `f` inside a transaction.
    pub fn transaction<R>(&self, f: impl FnOnce() -> R) -> Result<R, BusError> {
        self.begin_transaction();
        let result = f();
        self.end_transaction()?;
        Ok(result)
    }
}
