use std::collections::{HashMap, VecDeque};

use bytes::Bytes;
use tokio::sync::oneshot;

/// A client parked on a blocking pop. The sender delivers the popped value
/// straight to the waiting task; dropping it wakes the task empty-handed.
#[derive(Debug)]
pub struct ListWaiter {
    id: u64,
    sender: oneshot::Sender<Bytes>,
}

/// Coordinator for blocking list pops.
///
/// Holds one FIFO of waiters per list key, in the order the clients
/// suspended. The FIFOs are logically part of the keyspace: every caller
/// that touches both acquires the store lock first and the state lock
/// second, so a push and its hand-off are observed as a single step.
#[derive(Debug, Default)]
pub struct State {
    waiters: HashMap<Bytes, VecDeque<ListWaiter>>,
    next_waiter_id: u64,
}

impl State {
    pub fn new() -> Self {
        State {
            waiters: HashMap::new(),
            next_waiter_id: 0,
        }
    }

    /// Parks a new waiter at the tail of `key`'s FIFO and returns its id
    /// together with the receiving half of its wake-up channel.
    pub fn enqueue_waiter(&mut self, key: Bytes) -> (u64, oneshot::Receiver<Bytes>) {
        let id = self.next_waiter_id;
        self.next_waiter_id += 1;

        let (sender, receiver) = oneshot::channel();

        self.waiters
            .entry(key)
            .or_default()
            .push_back(ListWaiter { id, sender });

        (id, receiver)
    }

    /// Removes the waiter with `id` from `key`'s FIFO, if still parked.
    /// Called on timeout; a waiter that was already handed a value is no
    /// longer in the queue and this is a no-op.
    pub fn remove_waiter(&mut self, key: &[u8], id: u64) {
        if let Some(queue) = self.waiters.get_mut(key) {
            queue.retain(|waiter| waiter.id != id);

            if queue.is_empty() {
                self.waiters.remove(key);
            }
        }
    }

    pub fn has_waiters(&self, key: &[u8]) -> bool {
        self.waiters
            .get(key)
            .is_some_and(|queue| !queue.is_empty())
    }

    /// Delivers list heads to parked waiters, oldest first, until either
    /// the list or the FIFO runs out. Must run in the same critical section
    /// as the push that filled the list.
    ///
    /// A waiter whose receiving half is gone (client disconnected or timed
    /// out a moment ago) is skipped; if a send fails the value goes back to
    /// the list head and the next waiter is tried, so no value is lost.
    pub fn hand_off(&mut self, key: &[u8], list: &mut VecDeque<Bytes>) -> usize {
        let Some(queue) = self.waiters.get_mut(key) else {
            return 0;
        };

        let mut delivered = 0;

        while !list.is_empty() {
            let Some(waiter) = queue.pop_front() else {
                break;
            };

            if waiter.sender.is_closed() {
                continue;
            }

            let Some(value) = list.pop_front() else {
                break;
            };

            match waiter.sender.send(value) {
                Ok(()) => delivered += 1,
                Err(value) => list.push_front(value),
            }
        }

        if queue.is_empty() {
            self.waiters.remove(key);
        }

        delivered
    }

    /// Drops every parked waiter. Each waiting client observes a closed
    /// channel and resolves with an empty reply.
    pub fn drain(&mut self) {
        self.waiters.clear();
    }
}
