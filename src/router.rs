//! The router core: endpoint registry, routing table, forwarding policy
//! and local fan-out.
//!
//! One spawned task owns all routing state and is the only place it
//! mutates, giving a total order on state transitions without locks.
//! Drivers feed it raw byte chunks; [`RouterHandle`] feeds it commands.
//!
//! Frames whose message id the dialect does not know are forwarded
//! opaquely as broadcast so unrecognized traffic is not dropped between
//! peers. There is no loop suppression beyond never returning a frame to
//! its source endpoint; two routers blindly relaying to each other will
//! bounce such traffic.

use std::collections::HashMap;
use std::net::SocketAddr;

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};

use crate::codec::{self, MIN_FRAME_SIZE};
use crate::connectable::EndpointAddress;
use crate::connection::{self, Inbound, Link, Outbound};
use crate::error::{FrameError, RouterError};
use crate::frame::RawFrame;
use crate::subscription::{
    Delivery, Subscriber, SubscriptionCache, SubscriptionEntry, SubscriptionId,
    SubscriptionQuery, SubscriptionRegistry, SUBSCRIBER_QUEUE_DEPTH,
};
use crate::{MavHeader, MavlinkVersion, Message};

const INBOUND_QUEUE_DEPTH: usize = 256;
const COMMAND_QUEUE_DEPTH: usize = 32;

/// Stable, comparable identity of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKey {
    /// A configured link (TCP-out, serial, UDP-out): one endpoint per
    /// socket. The index survives reconnects.
    Link(usize),
    /// A peer learned on a UDP server socket: one endpoint per
    /// `(socket, peer)` so multiple peers multiplex on one binding.
    UdpPeer(usize, SocketAddr),
}

impl core::fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Link(index) => write!(f, "endpoint#{index}"),
            Self::UdpPeer(index, peer) => write!(f, "endpoint#{index}({peer})"),
        }
    }
}

/// Startup parameters for [`Router::start`].
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Source system id for locally originated frames.
    pub system_id: u8,
    /// Source component id for locally originated frames.
    pub component_id: u8,
    /// Connection strings, one per endpoint; see
    /// [`EndpointAddress`](crate::EndpointAddress).
    pub connections: Vec<String>,
}

enum Command<M: Message> {
    Send {
        message: M,
        version: MavlinkVersion,
    },
    Subscribe {
        query: SubscriptionQuery,
        reply: oneshot::Sender<Result<Subscriber<M>, RouterError>>,
    },
    Unsubscribe {
        id: SubscriptionId,
    },
    Shutdown,
}

/// Cloneable handle to a running router.
pub struct RouterHandle<M: Message> {
    commands: mpsc::Sender<Command<M>>,
}

impl<M: Message> Clone for RouterHandle<M> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
        }
    }
}

impl<M: Message> RouterHandle<M> {
    /// Pack and route a message from the local system, protocol v2.
    pub async fn send(&self, message: M) -> Result<(), RouterError> {
        self.send_with_version(message, MavlinkVersion::V2).await
    }

    /// Pack and route a message with an explicit protocol version.
    pub async fn send_with_version(
        &self,
        message: M,
        version: MavlinkVersion,
    ) -> Result<(), RouterError> {
        self.commands
            .send(Command::Send { message, version })
            .await
            .map_err(|_| RouterError::Closed)
    }

    /// Like [`send_with_version`](Self::send_with_version), taking the
    /// version by number as configuration files carry it.
    pub async fn send_versioned(&self, message: M, version: u8) -> Result<(), RouterError> {
        let version = match version {
            1 => MavlinkVersion::V1,
            2 => MavlinkVersion::V2,
            version => return Err(RouterError::ProtocolUndefined { version }),
        };
        self.send_with_version(message, version).await
    }

    /// Register a subscription and return its receiving end.
    pub async fn subscribe(
        &self,
        query: SubscriptionQuery,
    ) -> Result<Subscriber<M>, RouterError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Subscribe { query, reply })
            .await
            .map_err(|_| RouterError::Closed)?;
        response.await.map_err(|_| RouterError::Closed)?
    }

    /// Remove every subscription registered for the handle that owns `id`.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), RouterError> {
        self.commands
            .send(Command::Unsubscribe { id })
            .await
            .map_err(|_| RouterError::Closed)
    }

    /// Stop the router task. Drivers observe the closed channels and exit;
    /// the subscription cache stays alive.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}

struct Endpoint {
    writer: mpsc::Sender<Outbound>,
    /// Peer address for UDP-in endpoints, `None` elsewhere.
    dest: Option<SocketAddr>,
    /// Stream transports reassemble frames from this buffer.
    stream: bool,
    buffer: Vec<u8>,
}

/// The router task state. Constructed and consumed by [`Router::start`].
pub struct Router<M: Message> {
    system_id: u8,
    component_id: u8,
    links: Vec<Link>,
    endpoints: HashMap<EndpointKey, Endpoint>,
    routes: HashMap<(u8, u8), EndpointKey>,
    subscriptions: SubscriptionRegistry<M>,
    cache: SubscriptionCache<M>,
    /// Cancellation handles for the liveness watch tasks; dropping one
    /// releases that watcher's clone of the delivery channel.
    watchers: HashMap<SubscriptionId, oneshot::Sender<()>>,
    sequence: u8,
    closed_tx: mpsc::Sender<SubscriptionId>,
    // keeps the inbound channel open even with zero configured endpoints
    _inbound_tx: mpsc::Sender<Inbound>,
}

impl<M: Message> Router<M> {
    /// Start a router with a fresh subscription cache.
    ///
    /// Endpoints are created eagerly; unreachable ones keep retrying every
    /// second without failing startup. Invalid connection strings abort
    /// with [`RouterError::InvalidConnectionString`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: RouterConfig) -> Result<RouterHandle<M>, RouterError> {
        Self::start_with_cache(config, SubscriptionCache::spawn())
    }

    /// Start a router against an existing subscription cache, preserving
    /// the subscriptions registered with it by a previous router.
    pub fn start_with_cache(
        config: RouterConfig,
        cache: SubscriptionCache<M>,
    ) -> Result<RouterHandle<M>, RouterError> {
        let addresses = config
            .connections
            .iter()
            .map(|s| EndpointAddress::parse(s))
            .collect::<Result<Vec<_>, _>>()?;

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE_DEPTH);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (closed_tx, closed_rx) = mpsc::channel(16);

        let mut links = Vec::with_capacity(addresses.len());
        let mut endpoints = HashMap::new();
        for (index, address) in addresses.iter().enumerate() {
            let link = connection::spawn(index, address, inbound_tx.clone());
            // UDP servers have no peer yet; their endpoints appear on
            // first receive.
            if !matches!(address, EndpointAddress::UdpIn { .. }) {
                endpoints.insert(
                    EndpointKey::Link(index),
                    Endpoint {
                        writer: link.writer.clone(),
                        dest: None,
                        stream: link.stream,
                        buffer: Vec::new(),
                    },
                );
            }
            info!("endpoint#{index}: {address}");
            links.push(link);
        }

        let router = Self {
            system_id: config.system_id,
            component_id: config.component_id,
            links,
            endpoints,
            routes: HashMap::new(),
            subscriptions: SubscriptionRegistry::new(),
            cache,
            watchers: HashMap::new(),
            sequence: 0,
            closed_tx,
            _inbound_tx: inbound_tx,
        };
        tokio::spawn(router.run(inbound_rx, command_rx, closed_rx));

        Ok(RouterHandle {
            commands: command_tx,
        })
    }

    async fn run(
        mut self,
        mut inbound_rx: mpsc::Receiver<Inbound>,
        mut command_rx: mpsc::Receiver<Command<M>>,
        mut closed_rx: mpsc::Receiver<SubscriptionId>,
    ) {
        for entry in self.cache.snapshot().await {
            self.watch(entry.id, &entry.sender);
            self.subscriptions.insert(entry);
        }
        info!(
            "router started: system {} component {}",
            self.system_id, self.component_id
        );

        loop {
            tokio::select! {
                event = inbound_rx.recv() => match event {
                    Some(inbound) => self.on_inbound(inbound).await,
                    None => break,
                },
                command = command_rx.recv() => match command {
                    Some(Command::Send { message, version }) => {
                        self.send_local(message, version).await;
                    }
                    Some(Command::Subscribe { query, reply }) => {
                        let result = self.subscribe(query).await;
                        let _ = reply.send(result);
                    }
                    Some(Command::Unsubscribe { id }) => self.unsubscribe(id).await,
                    Some(Command::Shutdown) | None => break,
                },
                id = closed_rx.recv() => {
                    if let Some(id) = id {
                        debug!("subscriber {id} went away");
                        self.unsubscribe(id).await;
                    }
                },
            }
        }
        info!("router stopped");
    }

    /// Resolve the endpoint for a received chunk, learn new UDP peers, and
    /// drive the codec.
    async fn on_inbound(&mut self, inbound: Inbound) {
        let Inbound { key, bytes } = inbound;

        if !self.endpoints.contains_key(&key) {
            let EndpointKey::UdpPeer(index, peer) = key else {
                return;
            };
            let Some(link) = self.links.get(index) else {
                return;
            };
            info!("{key}: new peer");
            self.endpoints.insert(
                key,
                Endpoint {
                    writer: link.writer.clone(),
                    dest: Some(peer),
                    stream: false,
                    buffer: Vec::new(),
                },
            );
        }

        let endpoint = self
            .endpoints
            .get_mut(&key)
            .expect("endpoint resolved above");
        if endpoint.stream {
            endpoint.buffer.extend_from_slice(&bytes);
            loop {
                let endpoint = self
                    .endpoints
                    .get_mut(&key)
                    .expect("stream endpoints are never removed");
                if endpoint.buffer.len() < MIN_FRAME_SIZE {
                    break;
                }
                match codec::next_frame(&mut endpoint.buffer) {
                    Some(frame) => self.process_frame(key, frame).await,
                    None => break,
                }
            }
        } else {
            // one frame per datagram, nothing kept across datagrams
            match codec::datagram_frame(&bytes) {
                Ok(frame) => self.process_frame(key, frame).await,
                Err(e) => debug!("{key}: dropping datagram: {e}"),
            }
        }
    }

    async fn process_frame(&mut self, source: EndpointKey, frame: RawFrame) {
        match codec::validate::<M>(&frame) {
            Ok((message, target)) => {
                self.routes
                    .insert((frame.system_id(), frame.component_id()), source);
                self.forward(Some(source), &frame, target).await;
                self.fan_out(Some(&message), &frame, target);
            }
            Err(FrameError::UnknownMessage { id }) => {
                debug!("{source}: unknown message id {id}, forwarding as broadcast");
                self.routes
                    .insert((frame.system_id(), frame.component_id()), source);
                self.forward(Some(source), &frame, (0, 0)).await;
                self.fan_out(None, &frame, (0, 0));
            }
            Err(e) => debug!("{source}: dropping frame: {e}"),
        }
    }

    /// Forward a frame's raw bytes to remote endpoints.
    ///
    /// Broadcast goes to every endpoint except the source. Targeted frames
    /// go to each endpoint a matching `(system, component)` was last seen
    /// on, with `0` matching anything, and are never sent to endpoints the
    /// target has not been seen on.
    async fn forward(&mut self, source: Option<EndpointKey>, frame: &RawFrame, target: (u8, u8)) {
        let (target_system, target_component) = target;
        let mut keys: Vec<EndpointKey> = Vec::new();
        if target == (0, 0) {
            keys.extend(self.endpoints.keys().filter(|k| Some(**k) != source));
        } else {
            for (&(system_id, component_id), key) in &self.routes {
                if (target_system == 0 || target_system == system_id)
                    && (target_component == 0 || target_component == component_id)
                    && Some(*key) != source
                    && !keys.contains(key)
                {
                    keys.push(*key);
                }
            }
        }

        for key in keys {
            let Some(endpoint) = self.endpoints.get(&key) else {
                continue;
            };
            let out = Outbound {
                bytes: frame.raw_bytes().to_vec(),
                dest: endpoint.dest,
            };
            if endpoint.writer.send(out).await.is_err() {
                warn!("{key}: driver gone, dropping frame");
            }
        }
    }

    /// Deliver to matching local subscribers.
    ///
    /// `message` is `None` for frames outside the dialect; those reach
    /// only whole-frame subscribers with a wildcard message filter.
    fn fan_out(&self, message: Option<&M>, frame: &RawFrame, target: (u8, u8)) {
        let source = (frame.system_id(), frame.component_id());
        let message_id = message.map(Message::message_id);
        for entry in self.subscriptions.iter() {
            if !entry.query.matches(message_id, source, target) {
                continue;
            }
            let delivery = if entry.query.as_frame {
                Delivery::Frame(frame.clone())
            } else {
                match message {
                    Some(message) => Delivery::Message(message.clone()),
                    None => continue,
                }
            };
            match entry.sender.try_send(delivery) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    debug!("subscriber {} lagging, dropping delivery", entry.id);
                }
                // reconciled by the liveness watch, not here
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
    }

    /// Pack a locally originated message and route it as if received from
    /// the local endpoint.
    async fn send_local(&mut self, message: M, version: MavlinkVersion) {
        let header = MavHeader {
            system_id: self.system_id,
            component_id: self.component_id,
            sequence: self.next_sequence(),
        };
        let frame = RawFrame::pack(version, header, &message);
        let target = message.target();
        self.forward(None, &frame, target).await;
        self.fan_out(Some(&message), &frame, target);
    }

    /// One counter for all endpoints, incremented once per outbound frame.
    fn next_sequence(&mut self) -> u8 {
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        sequence
    }

    async fn subscribe(
        &mut self,
        query: SubscriptionQuery,
    ) -> Result<Subscriber<M>, RouterError> {
        let compiled = query.compile::<M>()?;
        let (sender, rx) = mpsc::channel(SUBSCRIBER_QUEUE_DEPTH);
        let id = self.cache.register(compiled.clone(), sender.clone()).await?;
        self.watch(id, &sender);
        self.subscriptions.insert(SubscriptionEntry {
            id,
            query: compiled,
            sender,
        });
        Ok(Subscriber::new(id, rx))
    }

    async fn unsubscribe(&mut self, id: SubscriptionId) {
        let removed = self.subscriptions.remove_handle(id);
        for id in &removed {
            self.watchers.remove(id);
        }
        if !removed.is_empty() {
            self.cache.deregister(removed).await;
        }
    }

    /// Liveness watch: report the subscription once its receiver is gone.
    /// The watcher itself is cancelled when the subscription is removed so
    /// its channel clone does not outlive the registry entry.
    fn watch(&mut self, id: SubscriptionId, sender: &mpsc::Sender<Delivery<M>>) {
        let sender = sender.clone();
        let closed_tx = self.closed_tx.clone();
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        self.watchers.insert(id, cancel_tx);
        tokio::spawn(async move {
            tokio::select! {
                _ = sender.closed() => {
                    let _ = closed_tx.send(id).await;
                }
                _ = cancel_rx => {}
            }
        });
    }
}
