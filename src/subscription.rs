//! Local subscriber registry and the out-of-router subscription cache.

use tokio::sync::{mpsc, oneshot};

use crate::error::RouterError;
use crate::frame::RawFrame;
use crate::Message;

/// Identifier handed out for a registered subscription.
pub type SubscriptionId = u64;

/// Queue depth of a subscriber's delivery channel.
pub(crate) const SUBSCRIBER_QUEUE_DEPTH: usize = 64;

/// What a matching subscriber receives.
#[derive(Debug, Clone)]
pub enum Delivery<M> {
    /// The decoded message.
    Message(M),
    /// The complete frame, on-wire bytes included.
    Frame(RawFrame),
}

/// A subscription predicate. `0` (or `None`) fields are wildcards.
///
/// Target-id fields only match targeted frames: a query with
/// `target_system: 5` does not match broadcast traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionQuery {
    /// Message name as in the dialect XML, e.g. `"HEARTBEAT"`.
    pub message: Option<String>,
    pub source_system: u8,
    pub source_component: u8,
    pub target_system: u8,
    pub target_component: u8,
    /// Deliver the whole frame instead of the decoded message. Frame
    /// subscribers with a wildcard `message` also receive frames whose id
    /// the dialect does not know.
    pub as_frame: bool,
}

impl SubscriptionQuery {
    pub(crate) fn compile<M: Message>(&self) -> Result<CompiledQuery, RouterError> {
        let message_id = match &self.message {
            Some(name) => Some(M::message_id_from_name(name).ok_or_else(|| {
                RouterError::InvalidMessage { name: name.clone() }
            })?),
            None => None,
        };
        Ok(CompiledQuery {
            message_id,
            source_system: self.source_system,
            source_component: self.source_component,
            target_system: self.target_system,
            target_component: self.target_component,
            as_frame: self.as_frame,
        })
    }
}

/// A query with its message name resolved against the dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompiledQuery {
    pub message_id: Option<u32>,
    pub source_system: u8,
    pub source_component: u8,
    pub target_system: u8,
    pub target_component: u8,
    pub as_frame: bool,
}

fn wildcard(query: u8, value: u8) -> bool {
    query == 0 || query == value
}

impl CompiledQuery {
    /// `message_id` is `None` for frames outside the dialect.
    pub(crate) fn matches(
        &self,
        message_id: Option<u32>,
        source: (u8, u8),
        target: (u8, u8),
    ) -> bool {
        match (self.message_id, message_id) {
            (Some(want), Some(have)) if want != have => return false,
            (Some(_), None) => return false,
            _ => {}
        }
        let broadcast = target == (0, 0);
        wildcard(self.source_system, source.0)
            && wildcard(self.source_component, source.1)
            && (self.target_system == 0 || (!broadcast && self.target_system == target.0))
            && (self.target_component == 0 || (!broadcast && self.target_component == target.1))
    }
}

/// One registered subscription.
#[derive(Debug)]
pub(crate) struct SubscriptionEntry<M> {
    pub id: SubscriptionId,
    pub query: CompiledQuery,
    pub sender: mpsc::Sender<Delivery<M>>,
}

impl<M> Clone for SubscriptionEntry<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            query: self.query.clone(),
            sender: self.sender.clone(),
        }
    }
}

/// The router's in-task view of the active subscriptions.
pub(crate) struct SubscriptionRegistry<M> {
    entries: Vec<SubscriptionEntry<M>>,
}

impl<M> SubscriptionRegistry<M> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register an entry, replacing any previous entry with the same query
    /// on the same channel.
    pub fn insert(&mut self, entry: SubscriptionEntry<M>) {
        self.entries
            .retain(|e| !(e.query == entry.query && e.sender.same_channel(&entry.sender)));
        self.entries.push(entry);
    }

    /// Remove every entry sharing a channel with the entry identified by
    /// `id`, returning the removed ids.
    pub fn remove_handle(&mut self, id: SubscriptionId) -> Vec<SubscriptionId> {
        let Some(handle) = self
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.sender.clone())
        else {
            return Vec::new();
        };
        let mut removed = Vec::new();
        self.entries.retain(|e| {
            if e.sender.same_channel(&handle) {
                removed.push(e.id);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubscriptionEntry<M>> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The receiving end of a subscription.
pub struct Subscriber<M> {
    id: SubscriptionId,
    rx: mpsc::Receiver<Delivery<M>>,
}

impl<M> Subscriber<M> {
    pub(crate) fn new(id: SubscriptionId, rx: mpsc::Receiver<Delivery<M>>) -> Self {
        Self { id, rx }
    }

    /// Id to pass to [`RouterHandle::unsubscribe`].
    ///
    /// [`RouterHandle::unsubscribe`]: crate::RouterHandle::unsubscribe
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Receive the next matching delivery. Returns `None` once the
    /// subscription has been removed and the queue drained.
    pub async fn recv(&mut self) -> Option<Delivery<M>> {
        self.rx.recv().await
    }
}

enum CacheCommand<M> {
    Register {
        query: CompiledQuery,
        sender: mpsc::Sender<Delivery<M>>,
        reply: oneshot::Sender<SubscriptionId>,
    },
    Deregister {
        ids: Vec<SubscriptionId>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<SubscriptionEntry<M>>>,
    },
}

/// Subscription store living outside the router task.
///
/// The cache owns the authoritative list of `(query, handle)` pairs. A
/// router loads it on startup, so a restarted router serves the same
/// subscribers without them re-subscribing; its own lifetime is bound to
/// the handle, not to any router.
pub struct SubscriptionCache<M: Message> {
    commands: mpsc::Sender<CacheCommand<M>>,
}

impl<M: Message> Clone for SubscriptionCache<M> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
        }
    }
}

impl<M: Message> SubscriptionCache<M> {
    /// Spawn the cache task. Must be called from within a Tokio runtime.
    pub fn spawn() -> Self {
        let (commands, mut rx) = mpsc::channel::<CacheCommand<M>>(16);
        tokio::spawn(async move {
            let mut entries: Vec<SubscriptionEntry<M>> = Vec::new();
            let mut next_id: SubscriptionId = 1;
            while let Some(command) = rx.recv().await {
                match command {
                    CacheCommand::Register {
                        query,
                        sender,
                        reply,
                    } => {
                        // (query, handle) pairs are stored once
                        let id = match entries
                            .iter()
                            .find(|e| e.query == query && e.sender.same_channel(&sender))
                        {
                            Some(existing) => existing.id,
                            None => {
                                let id = next_id;
                                next_id += 1;
                                entries.push(SubscriptionEntry { id, query, sender });
                                id
                            }
                        };
                        let _ = reply.send(id);
                    }
                    CacheCommand::Deregister { ids } => {
                        entries.retain(|e| !ids.contains(&e.id));
                    }
                    CacheCommand::Snapshot { reply } => {
                        entries.retain(|e| !e.sender.is_closed());
                        let _ = reply.send(entries.clone());
                    }
                }
            }
        });
        Self { commands }
    }

    pub(crate) async fn register(
        &self,
        query: CompiledQuery,
        sender: mpsc::Sender<Delivery<M>>,
    ) -> Result<SubscriptionId, RouterError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(CacheCommand::Register {
                query,
                sender,
                reply,
            })
            .await
            .map_err(|_| RouterError::Closed)?;
        response.await.map_err(|_| RouterError::Closed)
    }

    pub(crate) async fn deregister(&self, ids: Vec<SubscriptionId>) {
        let _ = self.commands.send(CacheCommand::Deregister { ids }).await;
    }

    /// Live entries, with closed handles pruned.
    pub(crate) async fn snapshot(&self) -> Vec<SubscriptionEntry<M>> {
        let (reply, response) = oneshot::channel();
        if self
            .commands
            .send(CacheCommand::Snapshot { reply })
            .await
            .is_err()
        {
            return Vec::new();
        }
        response.await.unwrap_or_default()
    }
}
