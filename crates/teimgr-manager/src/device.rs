//! Thread-safe host around a [`LinkManager`].
//!
//! Frame delivery from the driver, timer polling and control requests from the
//! entity owners may come from different threads. Each of them takes the
//! device lock for its full duration, so no timer ever fires while a frame for
//! the same link is being dispatched.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::{sleep, yield_now},
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, TryRecvError};
use teimgr_core::{
    config::TeiConfig,
    error::Result,
    handle::EntityHandle,
    transport::{CorrelationId, Link},
};
use teimgr_protocol::Role;
use teimgr_session::SessionState;

use crate::{
    event_types::TeiEvent,
    link_manager::LinkManager,
    registry::ChannelRequest,
    time::{Clock, SystemClock},
};

/// Shared handle to the TEI manager of one physical device.
pub struct Device<L: Link> {
    manager: Arc<Mutex<LinkManager<L>>>,
    clock: Arc<dyn Clock>,
    events: Receiver<TeiEvent>,
}

impl<L: Link> Clone for Device<L> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            clock: Arc::clone(&self.clock),
            events: self.events.clone(),
        }
    }
}

impl<L: Link> std::fmt::Debug for Device<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").field("manager", &self.manager).finish()
    }
}

impl<L: Link> Device<L> {
    /// Creates a device with the system clock.
    pub fn new(role: Role, link: L, config: &TeiConfig) -> Self {
        Self::with_clock(role, link, config, Arc::new(SystemClock))
    }

    /// Creates a device with a custom clock, e.g. a `ManualClock` in tests.
    pub fn with_clock(role: Role, link: L, config: &TeiConfig, clock: Arc<dyn Clock>) -> Self {
        let manager = LinkManager::new(role, link, config);
        let events = manager.event_receiver().clone();
        Self { manager: Arc::new(Mutex::new(manager)), clock, events }
    }

    /// Registers a layer-2 entity.
    pub fn create_entity(&self, request: ChannelRequest) -> Result<EntityHandle> {
        self.lock().create_entity(request)
    }

    /// Unregisters an entity.
    pub fn destroy_entity(&self, handle: EntityHandle) -> Result<()> {
        self.lock().destroy_entity(handle)
    }

    /// Starts TEI assignment for an entity.
    pub fn request_assignment(&self, handle: EntityHandle) -> Result<()> {
        let now = self.clock.now();
        self.lock().request_assignment(handle, now)
    }

    /// Answers an identity request with the entity's TEI.
    pub fn assign_fixed(&self, handle: EntityHandle, ri: u16, action_indicator: u8) -> Result<()> {
        let now = self.clock.now();
        self.lock().assign_fixed(handle, ri, action_indicator, now)
    }

    /// Reports a data-link error that may mean a duplicate TEI.
    pub fn report_link_error(&self, handle: EntityHandle) -> Result<()> {
        let now = self.clock.now();
        self.lock().report_link_error(handle, now)
    }

    /// Drops an entity's TEI.
    pub fn release_tei(&self, handle: EntityHandle) -> Result<()> {
        self.lock().release_tei(handle)
    }

    /// Delivers a received management frame.
    pub fn dispatch_inbound(&self, frame: &[u8]) -> Result<()> {
        let now = self.clock.now();
        self.lock().dispatch_inbound(frame, now)
    }

    /// Delivers a transmit confirmation.
    pub fn on_ack(&self, id: CorrelationId) -> bool {
        self.lock().on_ack(id)
    }

    /// Signals physical link activation.
    pub fn on_link_activated(&self) {
        self.lock().on_link_activated()
    }

    /// Signals physical link deactivation.
    pub fn on_link_deactivated(&self) {
        self.lock().on_link_deactivated()
    }

    /// Broadcasts a UI frame.
    pub fn send_unit_data(&self, payload: &[u8]) -> Result<()> {
        self.lock().send_unit_data(payload)
    }

    /// Current TEI of an entity.
    pub fn tei_of(&self, handle: EntityHandle) -> Option<u8> {
        self.lock().tei_of(handle)
    }

    /// Session state of an entity.
    pub fn session_state(&self, handle: EntityHandle) -> Option<SessionState> {
        self.lock().session_state(handle)
    }

    /// Runs `f` with exclusive access to the manager.
    pub fn with_manager<R>(&self, f: impl FnOnce(&mut LinkManager<L>) -> R) -> R {
        f(&mut self.lock())
    }

    /// Returns a clone of the event receiver.
    pub fn event_receiver(&self) -> Receiver<TeiEvent> {
        self.events.clone()
    }

    /// Receives the next pending event, if any.
    pub fn recv(&self) -> Option<TeiEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Fires the timers due at the clock's current time.
    pub fn poll(&self) {
        self.manual_poll(self.clock.now());
    }

    /// Fires the timers due at `time`.
    pub fn manual_poll(&self, time: Instant) {
        self.lock().poll(time);
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.lock().next_deadline()
    }

    /// Starts automatic polling in a loop with 1ms intervals (blocking call).
    pub fn start_polling(&self) {
        self.start_polling_with_duration(Some(Duration::from_millis(1)))
    }

    /// Starts automatic polling with custom sleep duration between polls (blocking call).
    pub fn start_polling_with_duration(&self, sleep_duration: Option<Duration>) {
        loop {
            self.poll();
            match sleep_duration {
                None => yield_now(),
                Some(duration) => sleep(duration),
            };
        }
    }

    fn lock(&self) -> MutexGuard<'_, LinkManager<L>> {
        self.manager.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::{io, thread};

    use teimgr_core::constants::GROUP_TEI;
    use teimgr_protocol::{FrameEncoder, MessageType, TeiMessage};

    use super::*;
    use crate::time::ManualClock;

    #[derive(Default)]
    struct SinkLink {
        frames: Vec<(CorrelationId, Vec<u8>)>,
    }

    impl Link for SinkLink {
        fn send_frame(&mut self, id: CorrelationId, frame: &[u8]) -> io::Result<()> {
            self.frames.push((id, frame.to_vec()));
            Ok(())
        }

        fn request_activation(&mut self) {}
    }

    #[test]
    fn test_device_clock_drives_timers() {
        let clock = Arc::new(ManualClock::default());
        let device =
            Device::with_clock(Role::Terminal, SinkLink::default(), &TeiConfig::default(), clock.clone());
        device.on_link_activated();
        let handle = device.create_entity(ChannelRequest::dynamic_terminal()).unwrap();
        device.request_assignment(handle).unwrap();

        for _ in 0..3 {
            let last = device.with_manager(|m| m.link().frames.last().map(|(id, _)| *id));
            assert!(device.on_ack(last.unwrap()));
            clock.advance(Duration::from_secs(1));
            device.poll();
        }
        assert_eq!(device.recv(), Some(TeiEvent::AssignmentFailed { entity: handle }));
        assert_eq!(device.session_state(handle), Some(SessionState::Idle));
        assert_eq!(device.recv(), None);
    }

    #[test]
    fn test_device_shared_across_threads() {
        let device = Device::new(Role::Terminal, SinkLink::default(), &TeiConfig::default());
        let handle = device.create_entity(ChannelRequest::dynamic_terminal()).unwrap();
        device.on_link_activated();
        device.request_assignment(handle).unwrap();
        let ri = device.with_manager(|m| m.entity(handle).map(|e| e.session().ri())).unwrap();

        let driver = device.clone();
        thread::spawn(move || {
            let frame = FrameEncoder::encode(&TeiMessage::new(MessageType::IdAssigned, ri, 72, true));
            driver.dispatch_inbound(&frame).unwrap();
        })
        .join()
        .unwrap();

        assert_eq!(device.tei_of(handle), Some(72));
        assert_eq!(device.recv(), Some(TeiEvent::AssignmentComplete { entity: handle, tei: 72 }));
        assert_eq!(device.with_manager(|m| m.find_by_tei(GROUP_TEI)), None);
    }
}
