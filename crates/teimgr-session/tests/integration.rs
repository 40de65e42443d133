//! Integration tests for the teimgr-session crate.
//!
//! These tests run a session's actions through the frame codec and the send
//! queue the way the link manager does, with a recording transport.

use std::{
    io,
    time::{Duration, Instant},
};

use teimgr_core::{
    config::TeiConfig,
    constants::GROUP_TEI,
    handle::EntityHandle,
    timer::{DeadlineTimers, TimerService},
    transport::{CorrelationId, Link},
};
use teimgr_protocol::{EntityRole, FrameDecoder, FrameEncoder, MessageType};
use teimgr_session::{
    EntityBinding, Notification, SendQueue, SessionAction, SessionContext, SessionInput,
    SessionState, TeiSession,
};

#[derive(Default)]
struct Wire {
    frames: Vec<(CorrelationId, Vec<u8>)>,
    activations: usize,
}

impl Link for Wire {
    fn send_frame(&mut self, id: CorrelationId, frame: &[u8]) -> io::Result<()> {
        self.frames.push((id, frame.to_vec()));
        Ok(())
    }

    fn request_activation(&mut self) {
        self.activations += 1;
    }
}

struct Harness {
    session: TeiSession,
    binding: EntityBinding,
    timers: DeadlineTimers,
    queue: SendQueue,
    wire: Wire,
    notifications: Vec<Notification>,
    now: Instant,
}

impl Harness {
    fn terminal() -> Self {
        Self {
            session: TeiSession::new(&TeiConfig::default(), EntityRole::Terminal),
            binding: EntityBinding::new(GROUP_TEI, EntityRole::Terminal),
            timers: DeadlineTimers::new(),
            queue: SendQueue::new(),
            wire: Wire::default(),
            notifications: Vec::new(),
            now: Instant::now(),
        }
    }

    fn feed(&mut self, input: SessionInput) {
        let mut ctx = SessionContext {
            owner: EntityHandle::new(0, 0),
            now: self.now,
            timers: &mut self.timers,
        };
        for action in self.session.handle(input, &mut self.binding, &mut ctx) {
            match action {
                SessionAction::Send(message) => {
                    self.queue.enqueue(FrameEncoder::encode(&message).to_vec(), &mut self.wire)
                }
                SessionAction::Notify(n) => self.notifications.push(n),
                other => panic!("unexpected action {:?}", other),
            }
        }
    }

    fn advance(&mut self, by: Duration) {
        self.now += by;
        for (handle, _) in self.timers.expire(self.now) {
            if self.session.owns_timer(handle) {
                self.feed(SessionInput::TimerExpired);
            }
        }
    }

    fn ack_last(&mut self) {
        let (id, _) = self.wire.frames.last().cloned().unwrap();
        assert!(self.queue.on_ack(id, &mut self.wire));
    }
}

#[test]
fn test_assignment_over_deferred_link() {
    let mut h = Harness::terminal();

    h.feed(SessionInput::StartAssign);
    assert_eq!(h.wire.activations, 1);
    assert!(h.wire.frames.is_empty());

    h.queue.on_link_activated(&mut h.wire);
    assert_eq!(h.wire.frames.len(), 1);
    let request = FrameDecoder::decode(&h.wire.frames[0].1).unwrap();
    assert_eq!(request.message_type, MessageType::IdRequest);
    assert_eq!(request.tei, GROUP_TEI);
    assert_eq!(request.ri, h.session.ri());
    assert!(h.queue.is_awaiting_ack());

    h.ack_last();
    let ri = h.session.ri();
    h.feed(SessionInput::FrameAssigned { ri, tei: 70, bound: None });
    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(h.binding.tei, 70);
    assert_eq!(h.notifications, vec![Notification::AssignmentComplete(70)]);
    assert_eq!(h.timers.pending(), 0);
}

#[test]
fn test_unanswered_requests_fail_after_three_attempts() {
    let mut h = Harness::terminal();
    h.queue.on_link_activated(&mut h.wire);

    h.feed(SessionInput::StartAssign);
    for _ in 0..2 {
        h.ack_last();
        h.advance(Duration::from_millis(1000));
    }
    h.ack_last();
    assert_eq!(h.wire.frames.len(), 3);

    let ris: Vec<u16> =
        h.wire.frames.iter().map(|(_, f)| FrameDecoder::decode(f).unwrap().ri).collect();
    assert_eq!(*ris.last().unwrap(), h.session.ri());

    h.advance(Duration::from_millis(999));
    assert!(h.notifications.is_empty());
    h.advance(Duration::from_millis(1));
    assert_eq!(h.notifications, vec![Notification::AssignmentFailed]);
    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(h.wire.frames.len(), 3);
    assert_eq!(h.timers.pending(), 0);
}

#[test]
fn test_late_assignment_after_failure_is_ignored() {
    let mut h = Harness::terminal();
    h.queue.on_link_activated(&mut h.wire);
    h.feed(SessionInput::StartAssign);
    let ri = h.session.ri();
    for _ in 0..3 {
        h.ack_last();
        h.advance(Duration::from_secs(1));
    }
    assert_eq!(h.notifications, vec![Notification::AssignmentFailed]);

    h.feed(SessionInput::FrameAssigned { ri, tei: 70, bound: None });
    assert_eq!(h.binding.tei, GROUP_TEI);
    assert_eq!(h.notifications.len(), 1);
}

#[test]
fn test_verify_then_check_keeps_tei() {
    let mut h = Harness::terminal();
    h.binding = EntityBinding::new(88, EntityRole::Terminal);
    h.queue.on_link_activated(&mut h.wire);

    h.feed(SessionInput::RequireVerify);
    let verify = FrameDecoder::decode(&h.wire.frames[0].1).unwrap();
    assert_eq!(verify.message_type, MessageType::IdVerify);
    assert_eq!(verify.tei, 88);
    h.ack_last();

    h.feed(SessionInput::FrameCheckReq { tei: 88 });
    let response = FrameDecoder::decode(&h.wire.frames[1].1).unwrap();
    assert_eq!(response.message_type, MessageType::IdCheckResponse);
    assert_eq!(response.tei, 88);
    assert_eq!(h.session.state(), SessionState::Idle);

    h.advance(Duration::from_secs(5));
    assert!(h.notifications.is_empty());
    assert_eq!(h.binding.tei, 88);
}
