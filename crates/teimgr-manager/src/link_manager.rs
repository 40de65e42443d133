//! TEI management for one physical link.
//!
//! A [`LinkManager`] owns the entity registry, the outbound [`SendQueue`] and
//! the timer service of a device. Inbound frames are validated, checked against
//! the manager's [`Role`] and then routed either to the owner (`ID_REQUEST`) or
//! to every entity session. Session actions are executed here: frames go
//! through the send queue, notifications become [`TeiEvent`]s.

use std::time::Instant;

use crossbeam_channel::Receiver;
use teimgr_core::{
    config::TeiConfig,
    constants::{FIRST_DYNAMIC_TEI, GROUP_TEI, TEI_SAPI},
    error::{ErrorKind, Result},
    handle::EntityHandle,
    timer::{DeadlineTimers, TimerService},
    transport::{CorrelationId, Link},
};
use teimgr_protocol::{EntityRole, FrameDecoder, FrameEncoder, MessageType, Role, TeiMessage};
use teimgr_session::{
    BoundTei, Notification, SendQueue, SessionAction, SessionContext, SessionInput, SessionState,
};
use tracing::{debug, trace, warn};

use crate::{
    event_types::{ChannelSink, EventSink, TeiEvent},
    registry::{ChannelRequest, EntityRegistry, Layer2Entity},
};

/// TEI manager of one device: entity registry, dispatch and outbound flow control.
pub struct LinkManager<L: Link, T: TimerService = DeadlineTimers> {
    role: Role,
    config: TeiConfig,
    link: L,
    timers: T,
    entities: EntityRegistry,
    send_queue: SendQueue,
    events: ChannelSink<TeiEvent>,
    event_receiver: Receiver<TeiEvent>,
}

impl<L: Link, T: TimerService> std::fmt::Debug for LinkManager<L, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkManager")
            .field("role", &self.role)
            .field("config", &self.config)
            .field("link", &"<link>")
            .field("entities", &self.entities)
            .field("send_queue", &self.send_queue)
            .finish()
    }
}

impl<L: Link> LinkManager<L> {
    /// Creates a manager driving its own [`DeadlineTimers`].
    pub fn new(role: Role, link: L, config: &TeiConfig) -> Self {
        Self::with_timers(role, link, config, DeadlineTimers::new())
    }
}

impl<L: Link, T: TimerService> LinkManager<L, T> {
    /// Creates a manager over a caller-supplied timer service.
    pub fn with_timers(role: Role, link: L, config: &TeiConfig, timers: T) -> Self {
        let (events, event_receiver) = ChannelSink::with_capacity(config.event_buffer_size);
        Self {
            role,
            config: config.clone(),
            link,
            timers,
            entities: EntityRegistry::new(),
            send_queue: SendQueue::new(),
            events,
            event_receiver,
        }
    }

    /// Registers a layer-2 entity.
    ///
    /// Fixed TEIs (below 64, 0 meaning point-to-point) are bound immediately and
    /// never negotiated. Terminal-side entities negotiate when created with the
    /// group TEI; they may not claim a TEI of the automatic range directly.
    pub fn create_entity(&mut self, request: ChannelRequest) -> Result<EntityHandle> {
        if request.sapi != TEI_SAPI {
            return Err(ErrorKind::UnsupportedSapi(request.sapi));
        }
        if request.tei > GROUP_TEI {
            return Err(ErrorKind::InvalidTei(request.tei));
        }
        if !self.role.supports(request.protocol) {
            return Err(ErrorKind::UnsupportedProtocol(request.protocol.name()));
        }
        if request.protocol == EntityRole::Terminal
            && (FIRST_DYNAMIC_TEI..GROUP_TEI).contains(&request.tei)
        {
            return Err(ErrorKind::InvalidTei(request.tei));
        }

        let handle = self.entities.insert(Layer2Entity::new(request, &self.config));
        debug!(
            entity = %handle,
            tei = request.tei,
            protocol = request.protocol.name(),
            "entity created"
        );
        Ok(handle)
    }

    /// Unregisters an entity, cancelling its pending timer.
    pub fn destroy_entity(&mut self, handle: EntityHandle) -> Result<()> {
        let mut entity = self.entities.remove(handle).ok_or_else(|| unknown(handle))?;
        entity.session.shutdown(&mut self.timers);
        debug!(entity = %handle, tei = entity.tei(), "entity destroyed");
        Ok(())
    }

    /// The entity's data link wants a TEI (MDL-ASSIGN indication).
    ///
    /// Fixed entities are confirmed at once; others start the identity request procedure.
    pub fn request_assignment(&mut self, handle: EntityHandle, time: Instant) -> Result<()> {
        let entity = self.entities.get(handle).ok_or_else(|| unknown(handle))?;
        if entity.is_fixed() {
            let tei = entity.tei();
            debug!(entity = %handle, tei, "fixed assign tei");
            self.events.send(TeiEvent::AssignmentComplete { entity: handle, tei });
            return Ok(());
        }
        if entity.protocol() == EntityRole::Network {
            return Err(ErrorKind::RoleMismatch("identity requests originate on the terminal side"));
        }
        self.drive(handle, SessionInput::StartAssign, time)
    }

    /// Answers an `ID_REQUEST` with the TEI the network-side entity already holds.
    pub fn assign_fixed(
        &mut self,
        handle: EntityHandle,
        ri: u16,
        action_indicator: u8,
        time: Instant,
    ) -> Result<()> {
        if !self.role.is_network() {
            return Err(ErrorKind::RoleMismatch("assignments are sent by the network side"));
        }
        self.drive(handle, SessionInput::StartAssignFixed { ri, ai: action_indicator }, time)
    }

    /// The entity's data link saw an error hinting at a duplicate TEI (MDL-ERROR indication).
    pub fn report_link_error(&mut self, handle: EntityHandle, time: Instant) -> Result<()> {
        let entity = self.entities.get(handle).ok_or_else(|| unknown(handle))?;
        if entity.is_fixed() {
            trace!(entity = %handle, "link error on fixed tei ignored");
            return Ok(());
        }
        self.drive(handle, SessionInput::RequireVerify, time)
    }

    /// Drops the entity's TEI, typically after [`TeiEvent::RemovalRequested`].
    ///
    /// Any procedure still running for the entity is stopped. Fixed TEIs are
    /// administrative and stay bound.
    pub fn release_tei(&mut self, handle: EntityHandle) -> Result<()> {
        let entity = self.entities.get_mut(handle).ok_or_else(|| unknown(handle))?;
        if entity.is_fixed() {
            trace!(entity = %handle, "release of fixed tei ignored");
            return Ok(());
        }
        entity.session.shutdown(&mut self.timers);
        debug!(entity = %handle, tei = entity.tei(), "tei released");
        entity.binding.tei = GROUP_TEI;
        Ok(())
    }

    /// Processes one raw frame received on the management SAPI.
    ///
    /// Short frames and address extension errors are returned; frames for other
    /// SAPIs, TEIs or entities are dropped silently. A message type travelling in
    /// the wrong direction for this manager yields [`ErrorKind::RoleMismatch`].
    pub fn dispatch_inbound(&mut self, frame: &[u8], time: Instant) -> Result<()> {
        let message = match FrameDecoder::decode(frame) {
            Ok(message) => message,
            Err(e) if e.is_structural() => {
                warn!(len = frame.len(), "bad management frame: {}", e);
                return Err(e.into());
            }
            Err(e) => {
                debug!("management frame discarded: {}", e);
                return Ok(());
            }
        };

        let message_type = message.message_type;
        if !self.role.accepts(message_type.direction()) {
            debug!(mt = message_type.name(), "message not for this side");
            return Err(ErrorKind::RoleMismatch(message_type.name()));
        }
        trace!(mt = message_type.name(), ri = message.ri, tei = message.tei, "tei handler");

        let input = match message_type {
            MessageType::IdRequest => {
                self.events.send(TeiEvent::IdentityRequest {
                    ri: message.ri,
                    action_indicator: message.tei,
                });
                return Ok(());
            }
            MessageType::IdAssigned => SessionInput::FrameAssigned {
                ri: message.ri,
                tei: message.tei,
                bound: self.bound_tei(message.tei),
            },
            MessageType::IdDenied => SessionInput::FrameDenied { ri: message.ri, tei: message.tei },
            MessageType::IdCheckRequest => SessionInput::FrameCheckReq { tei: message.tei },
            MessageType::IdRemove => SessionInput::FrameRemove { tei: message.tei },
            MessageType::IdCheckResponse | MessageType::IdVerify => {
                debug!(mt = message_type.name(), tei = message.tei, "no network-side handler");
                return Ok(());
            }
        };

        // Everything fanned out travels from the network, so only terminal-side
        // entities take part.
        let mut verifies = Vec::new();
        for handle in self.entities.handles() {
            let skip = self
                .entities
                .get(handle)
                .map_or(true, |entity| {
                    entity.protocol() == EntityRole::Network || entity.binding.ignores_management()
                });
            if skip {
                continue;
            }
            self.step(handle, input, time, &mut verifies)?;
        }
        self.raise_verifies(verifies, time);
        Ok(())
    }

    /// Entity bound to `tei`, if any.
    pub fn find_by_tei(&self, tei: u8) -> Option<EntityHandle> {
        self.entities.find_by_tei(tei)
    }

    /// Transmit confirmation from the link. Returns false if `id` is not the frame in flight.
    pub fn on_ack(&mut self, id: CorrelationId) -> bool {
        self.send_queue.on_ack(id, &mut self.link)
    }

    /// The physical link came up.
    pub fn on_link_activated(&mut self) {
        debug!(queued = self.send_queue.len(), "link activated");
        self.send_queue.on_link_activated(&mut self.link);
    }

    /// The physical link went down. Queued frames are kept.
    pub fn on_link_deactivated(&mut self) {
        debug!(queued = self.send_queue.len(), "link deactivated");
        self.send_queue.on_link_deactivated();
    }

    /// Queues a UI frame carrying `payload` to the broadcast TEI. Network side only.
    pub fn send_unit_data(&mut self, payload: &[u8]) -> Result<()> {
        if !self.role.is_network() {
            return Err(ErrorKind::RoleMismatch("unit data is sent by the network side"));
        }
        let frame = FrameEncoder::unit_data(payload);
        self.send_queue.enqueue(frame, &mut self.link);
        Ok(())
    }

    /// Fires every timer due at `time`.
    pub fn poll(&mut self, time: Instant) {
        for (timer, owner) in self.timers.expire(time) {
            let current = self
                .entities
                .get(owner)
                .is_some_and(|entity| entity.session.owns_timer(timer));
            if !current {
                trace!(entity = %owner, timer = timer.raw(), "stale timer");
                continue;
            }
            if let Err(e) = self.drive(owner, SessionInput::TimerExpired, time) {
                warn!(entity = %owner, "timer dispatch failed: {}", e);
            }
        }
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Role of this manager.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Configuration in use.
    pub fn config(&self) -> &TeiConfig {
        &self.config
    }

    /// Registered entity.
    pub fn entity(&self, handle: EntityHandle) -> Option<&Layer2Entity> {
        self.entities.get(handle)
    }

    /// All registered entities.
    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    /// Number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Session state of an entity.
    pub fn session_state(&self, handle: EntityHandle) -> Option<SessionState> {
        self.entities.get(handle).map(|entity| entity.session().state())
    }

    /// Current TEI of an entity.
    pub fn tei_of(&self, handle: EntityHandle) -> Option<u8> {
        self.entities.get(handle).map(Layer2Entity::tei)
    }

    /// Receiver for [`TeiEvent`]s.
    pub fn event_receiver(&self) -> &Receiver<TeiEvent> {
        &self.event_receiver
    }

    /// Outbound queue state.
    pub fn send_queue(&self) -> &SendQueue {
        &self.send_queue
    }

    /// Lower transport.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Lower transport, mutably.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Timer service.
    pub fn timers(&self) -> &T {
        &self.timers
    }

    fn bound_tei(&self, tei: u8) -> Option<BoundTei> {
        let entity = self.entities.find_by_tei_on(tei, EntityRole::Terminal)?;
        let ri = self.entities.get(entity)?.session().ri();
        Some(BoundTei { entity, ri })
    }

    fn drive(&mut self, handle: EntityHandle, input: SessionInput, time: Instant) -> Result<()> {
        let mut verifies = Vec::new();
        self.step(handle, input, time, &mut verifies)?;
        self.raise_verifies(verifies, time);
        Ok(())
    }

    /// Runs one session transition and executes its actions. Verify requests for
    /// other entities are collected into `verifies`.
    fn step(
        &mut self,
        handle: EntityHandle,
        input: SessionInput,
        time: Instant,
        verifies: &mut Vec<EntityHandle>,
    ) -> Result<()> {
        let entity = self.entities.get_mut(handle).ok_or_else(|| unknown(handle))?;
        let mut ctx = SessionContext { owner: handle, now: time, timers: &mut self.timers };
        let actions = entity.session.handle(input, &mut entity.binding, &mut ctx);

        for action in actions {
            match action {
                SessionAction::Send(message) => self.send_message(&message),
                SessionAction::Notify(notification) => {
                    self.events.send(owner_event(handle, notification))
                }
                SessionAction::Verify(other) => {
                    if !verifies.contains(&other) {
                        verifies.push(other);
                    }
                }
                SessionAction::ReportError(other) => {
                    self.events.send(TeiEvent::ErrorDetected { entity: other })
                }
            }
        }
        Ok(())
    }

    fn raise_verifies(&mut self, verifies: Vec<EntityHandle>, time: Instant) {
        for handle in verifies {
            let mut nested = Vec::new();
            if let Err(e) = self.step(handle, SessionInput::RequireVerify, time, &mut nested) {
                debug!(entity = %handle, "verify target gone: {}", e);
            }
        }
    }

    fn send_message(&mut self, message: &TeiMessage) {
        trace!(mt = message.message_type.name(), ri = message.ri, tei = message.tei, "queue frame");
        let frame = FrameEncoder::encode(message);
        self.send_queue.enqueue(frame.to_vec(), &mut self.link);
    }
}

fn owner_event(entity: EntityHandle, notification: Notification) -> TeiEvent {
    match notification {
        Notification::AssignmentComplete(tei) => TeiEvent::AssignmentComplete { entity, tei },
        Notification::AssignmentFailed => TeiEvent::AssignmentFailed { entity },
        Notification::RemovalRequested => TeiEvent::RemovalRequested { entity },
    }
}

fn unknown(handle: EntityHandle) -> ErrorKind {
    ErrorKind::UnknownEntity(handle.to_string())
}
