//! Per-entity TEI management state machine.
//!
//! A [`TeiSession`] never touches the registry or the link directly. The
//! manager hands it the entity's [`EntityBinding`] plus a [`SessionContext`]
//! (timer service, clock, own handle) and executes the returned
//! [`SessionAction`]s afterwards.

use std::time::{Duration, Instant};

use teimgr_core::{
    config::TeiConfig,
    constants::{GROUP_TEI, MAX_FIXED_TEI},
    handle::EntityHandle,
    timer::{TimerHandle, TimerService},
};
use teimgr_protocol::{EntityRole, MessageType, TeiMessage};
use tracing::{debug, trace, warn};

use crate::session_state::SessionState;

/// TEI binding of a layer-2 entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityBinding {
    /// Current TEI, or [`GROUP_TEI`] while unassigned.
    pub tei: u8,
    /// TEI was pinned administratively and is never negotiated.
    pub fixed: bool,
    /// Protocol side the entity runs.
    pub protocol: EntityRole,
}

impl EntityBinding {
    /// Creates a binding; TEIs up to [`MAX_FIXED_TEI`] are fixed.
    pub fn new(tei: u8, protocol: EntityRole) -> Self {
        Self { tei, fixed: tei <= MAX_FIXED_TEI, protocol }
    }

    /// Returns true if a TEI is bound.
    pub fn is_assigned(&self) -> bool {
        self.tei != GROUP_TEI
    }

    /// Returns true for the point-to-point TEI 0.
    pub fn is_point_to_point(&self) -> bool {
        self.tei == 0
    }

    /// Returns true if a message whose action indicator is `tei` concerns this entity.
    pub fn addressed_by(&self, tei: u8) -> bool {
        self.is_assigned() && (tei == GROUP_TEI || tei == self.tei)
    }

    /// Fixed TEIs on the terminal side take no part in TEI management.
    pub fn ignores_management(&self) -> bool {
        self.fixed && self.protocol != EntityRole::Network
    }
}

/// Registered entity currently holding the TEI named in an ID_ASSIGNED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundTei {
    /// Entity holding the TEI.
    pub entity: EntityHandle,
    /// Reference number stored by that entity's session.
    pub ri: u16,
}

/// Events driving a [`TeiSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInput {
    /// Owner wants a dynamically assigned TEI.
    StartAssign,
    /// Network side answers an identity request with the entity's known TEI.
    StartAssignFixed {
        /// Reference number of the request being answered.
        ri: u16,
        /// Action indicator of the request.
        ai: u8,
    },
    /// ID_ASSIGNED received.
    FrameAssigned {
        /// Reference number of the frame.
        ri: u16,
        /// Assigned TEI.
        tei: u8,
        /// Local entity already bound to `tei`, looked up before delivery.
        bound: Option<BoundTei>,
    },
    /// ID_DENIED received.
    FrameDenied {
        /// Reference number of the frame.
        ri: u16,
        /// Action indicator of the frame.
        tei: u8,
    },
    /// ID_CHK_REQ received.
    FrameCheckReq {
        /// TEI being checked, or the group TEI for all.
        tei: u8,
    },
    /// ID_REMOVE received.
    FrameRemove {
        /// TEI being removed, or the group TEI for all.
        tei: u8,
    },
    /// Layer 2 detected an error that may mean the TEI is duplicated.
    RequireVerify,
    /// The session's retransmission timer fired.
    TimerExpired,
}

/// Outcome reported to the entity owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// A TEI was bound.
    AssignmentComplete(u8),
    /// Identity requests were exhausted; the entity stays unassigned.
    AssignmentFailed,
    /// The TEI must be released.
    RemovalRequested,
}

/// Side effects requested by a transition, executed by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Queue a management frame.
    Send(TeiMessage),
    /// Tell this entity's owner.
    Notify(Notification),
    /// Raise `RequireVerify` on another entity.
    Verify(EntityHandle),
    /// Report a suspected duplicate TEI to another entity's owner.
    ReportError(EntityHandle),
}

/// Execution context passed into every transition.
pub struct SessionContext<'a> {
    /// Handle of the entity owning the session.
    pub owner: EntityHandle,
    /// Current time, used to arm timers.
    pub now: Instant,
    /// Timer service shared by all sessions of the link.
    pub timers: &'a mut dyn TimerService,
}

/// TEI management procedures of one layer-2 entity.
#[derive(Debug)]
pub struct TeiSession {
    state: SessionState,
    /// Reference number of the outstanding (or last) transaction
    ri: u16,
    retries_remaining: u8,
    interval: Duration,
    timer: Option<TimerHandle>,
    request_attempts: u8,
    verify_attempts: u8,
}

impl TeiSession {
    /// Creates an idle session; the timer interval follows the entity's protocol side.
    pub fn new(config: &TeiConfig, protocol: EntityRole) -> Self {
        let interval = match protocol {
            EntityRole::Terminal => config.terminal_timer,
            EntityRole::Network => config.network_timer,
        };
        Self {
            state: SessionState::Idle,
            ri: 0,
            retries_remaining: 0,
            interval,
            timer: None,
            request_attempts: config.id_request_attempts,
            verify_attempts: config.verify_attempts,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Reference number of the current or most recent transaction.
    pub fn ri(&self) -> u16 {
        self.ri
    }

    /// Transmissions left before the running procedure gives up.
    pub fn retries_remaining(&self) -> u8 {
        self.retries_remaining
    }

    /// Retransmission interval (T201 or T202).
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Pending retransmission timer, if any.
    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    /// Returns true if `handle` is this session's pending timer.
    pub fn owns_timer(&self, handle: TimerHandle) -> bool {
        self.timer == Some(handle)
    }

    /// Cancels the pending timer, if any, and rests in `Idle`. Used when the entity goes away.
    pub fn shutdown(&mut self, timers: &mut dyn TimerService) {
        self.cancel_timer(timers);
        self.state = SessionState::Idle;
    }

    /// Runs one event through the state machine.
    pub fn handle(
        &mut self,
        input: SessionInput,
        binding: &mut EntityBinding,
        ctx: &mut SessionContext<'_>,
    ) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        match (self.state, input) {
            (SessionState::Idle, SessionInput::StartAssign) => {
                self.identity_request(binding, ctx, &mut actions)
            }
            (SessionState::Idle, SessionInput::StartAssignFixed { ri, ai }) => {
                self.assign_fixed(ri, ai, binding, ctx, &mut actions)
            }
            (SessionState::Idle, SessionInput::FrameAssigned { ri, tei, bound }) => {
                self.test_duplicate(ri, tei, bound, ctx, &mut actions)
            }
            (SessionState::Idle, SessionInput::RequireVerify) => {
                self.identity_verify(binding, ctx, &mut actions)
            }
            (SessionState::Idle | SessionState::Verifying, SessionInput::FrameRemove { tei }) => {
                self.identity_remove(tei, binding, ctx, &mut actions)
            }
            (SessionState::Idle | SessionState::Verifying, SessionInput::FrameCheckReq { tei }) => {
                self.identity_check(tei, binding, ctx, &mut actions)
            }
            (SessionState::RequestingId, SessionInput::TimerExpired) => {
                self.request_timeout(binding, ctx, &mut actions)
            }
            (SessionState::RequestingId, SessionInput::FrameAssigned { ri, tei, bound }) => {
                self.identity_assign(ri, tei, bound, binding, ctx, &mut actions)
            }
            (SessionState::RequestingId, SessionInput::FrameDenied { ri, tei }) => {
                // No retry and no failure report on denial; the request timer keeps running.
                debug!(entity = %ctx.owner, ri, tei, "identity denied");
            }
            (SessionState::Verifying, SessionInput::TimerExpired) => {
                self.verify_timeout(binding, ctx, &mut actions)
            }
            (state, input) => {
                trace!(entity = %ctx.owner, state = state.name(), ?input, "event ignored");
            }
        }

        debug_assert_eq!(self.state.has_timer(), self.timer.is_some());
        actions
    }

    fn identity_request(
        &mut self,
        binding: &EntityBinding,
        ctx: &mut SessionContext<'_>,
        actions: &mut Vec<SessionAction>,
    ) {
        if binding.is_assigned() {
            debug!(entity = %ctx.owner, tei = binding.tei, "assign request for already assigned tei");
            return;
        }
        self.ri = random_ri();
        debug!(entity = %ctx.owner, ri = self.ri, "assign request");
        self.send(actions, binding, MessageType::IdRequest, self.ri, GROUP_TEI);
        self.change_state(SessionState::RequestingId, ctx.owner);
        self.retries_remaining = self.request_attempts;
        self.arm_timer(ctx);
    }

    fn assign_fixed(
        &mut self,
        ri: u16,
        ai: u8,
        binding: &EntityBinding,
        ctx: &mut SessionContext<'_>,
        actions: &mut Vec<SessionAction>,
    ) {
        if binding.protocol != EntityRole::Network {
            warn!(entity = %ctx.owner, "fixed assignment requested on terminal-side entity");
            return;
        }
        if !binding.is_assigned() {
            debug!(entity = %ctx.owner, "net tei assign request without tei");
            return;
        }
        self.ri = ri;
        debug!(entity = %ctx.owner, ri, ai, tei = binding.tei, "net assign request");
        self.send(actions, binding, MessageType::IdAssigned, ri, binding.tei);
    }

    fn test_duplicate(
        &mut self,
        ri: u16,
        tei: u8,
        bound: Option<BoundTei>,
        ctx: &mut SessionContext<'_>,
        actions: &mut Vec<SessionAction>,
    ) {
        debug!(entity = %ctx.owner, ri, tei, "foreign identity assign");
        if let Some(bound) = bound {
            if bound.ri != ri {
                warn!(entity = %bound.entity, tei, "possible duplicate assignment");
                actions.push(SessionAction::Verify(bound.entity));
            }
        }
    }

    fn identity_assign(
        &mut self,
        ri: u16,
        tei: u8,
        bound: Option<BoundTei>,
        binding: &mut EntityBinding,
        ctx: &mut SessionContext<'_>,
        actions: &mut Vec<SessionAction>,
    ) {
        debug!(entity = %ctx.owner, ri, tei, "identity assign");
        if let Some(bound) = bound {
            // Somebody on this link already holds the TEI: never take it over.
            if bound.ri != ri {
                warn!(entity = %bound.entity, tei, "possible duplicate assignment");
                actions.push(SessionAction::ReportError(bound.entity));
            }
            return;
        }
        if ri != self.ri {
            return;
        }
        if tei == GROUP_TEI {
            debug!(entity = %ctx.owner, ri, "assigned the group tei, entity stays unassigned");
        }
        self.cancel_timer(ctx.timers);
        self.change_state(SessionState::Idle, ctx.owner);
        binding.tei = tei;
        actions.push(SessionAction::Notify(Notification::AssignmentComplete(tei)));
    }

    fn identity_check(
        &mut self,
        tei: u8,
        binding: &EntityBinding,
        ctx: &mut SessionContext<'_>,
        actions: &mut Vec<SessionAction>,
    ) {
        debug!(entity = %ctx.owner, tei, "identity check req");
        if !binding.addressed_by(tei) {
            return;
        }
        self.cancel_timer(ctx.timers);
        self.change_state(SessionState::Idle, ctx.owner);
        self.send(actions, binding, MessageType::IdCheckResponse, random_ri(), binding.tei);
    }

    fn identity_remove(
        &mut self,
        tei: u8,
        binding: &EntityBinding,
        ctx: &mut SessionContext<'_>,
        actions: &mut Vec<SessionAction>,
    ) {
        debug!(entity = %ctx.owner, tei, "identity remove");
        if !binding.addressed_by(tei) {
            return;
        }
        self.cancel_timer(ctx.timers);
        self.change_state(SessionState::Idle, ctx.owner);
        actions.push(SessionAction::Notify(Notification::RemovalRequested));
    }

    fn identity_verify(
        &mut self,
        binding: &EntityBinding,
        ctx: &mut SessionContext<'_>,
        actions: &mut Vec<SessionAction>,
    ) {
        if !binding.is_assigned() {
            debug!(entity = %ctx.owner, "verify request without tei");
            return;
        }
        debug!(entity = %ctx.owner, tei = binding.tei, "id verify request");
        self.send(actions, binding, MessageType::IdVerify, 0, binding.tei);
        self.change_state(SessionState::Verifying, ctx.owner);
        self.retries_remaining = self.verify_attempts;
        self.arm_timer(ctx);
    }

    fn request_timeout(
        &mut self,
        binding: &EntityBinding,
        ctx: &mut SessionContext<'_>,
        actions: &mut Vec<SessionAction>,
    ) {
        self.timer = None;
        self.retries_remaining = self.retries_remaining.saturating_sub(1);
        if self.retries_remaining > 0 {
            self.ri = random_ri();
            debug!(
                entity = %ctx.owner,
                attempt = self.request_attempts - self.retries_remaining + 1,
                ri = self.ri,
                "assign request retransmit"
            );
            self.send(actions, binding, MessageType::IdRequest, self.ri, GROUP_TEI);
            self.arm_timer(ctx);
        } else {
            warn!(entity = %ctx.owner, "assign request failed");
            actions.push(SessionAction::Notify(Notification::AssignmentFailed));
            self.change_state(SessionState::Idle, ctx.owner);
        }
    }

    fn verify_timeout(
        &mut self,
        binding: &EntityBinding,
        ctx: &mut SessionContext<'_>,
        actions: &mut Vec<SessionAction>,
    ) {
        self.timer = None;
        self.retries_remaining = self.retries_remaining.saturating_sub(1);
        if self.retries_remaining > 0 {
            debug!(entity = %ctx.owner, tei = binding.tei, "id verify retransmit");
            self.send(actions, binding, MessageType::IdVerify, 0, binding.tei);
            self.arm_timer(ctx);
        } else {
            warn!(entity = %ctx.owner, tei = binding.tei, "verify request failed");
            actions.push(SessionAction::Notify(Notification::RemovalRequested));
            self.change_state(SessionState::Idle, ctx.owner);
        }
    }

    fn send(
        &self,
        actions: &mut Vec<SessionAction>,
        binding: &EntityBinding,
        message_type: MessageType,
        ri: u16,
        tei: u8,
    ) {
        let command = binding.protocol.command_bit();
        actions.push(SessionAction::Send(TeiMessage::new(message_type, ri, tei, command)));
    }

    fn change_state(&mut self, state: SessionState, owner: EntityHandle) {
        if self.state != state {
            trace!(entity = %owner, from = self.state.name(), to = state.name(), "state change");
            self.state = state;
        }
    }

    fn arm_timer(&mut self, ctx: &mut SessionContext<'_>) {
        if let Some(previous) = self.timer.take() {
            ctx.timers.cancel(previous);
        }
        self.timer = Some(ctx.timers.schedule(ctx.owner, self.interval, ctx.now));
    }

    fn cancel_timer(&mut self, timers: &mut dyn TimerService) {
        if let Some(handle) = self.timer.take() {
            timers.cancel(handle);
        }
    }
}

/// Fresh reference number for a new transaction.
fn random_ri() -> u16 {
    rand::random()
}

#[cfg(test)]
mod tests {
    use teimgr_core::timer::DeadlineTimers;

    use super::*;

    struct Fixture {
        session: TeiSession,
        binding: EntityBinding,
        timers: DeadlineTimers,
        owner: EntityHandle,
        now: Instant,
    }

    impl Fixture {
        fn terminal() -> Self {
            Self::new(GROUP_TEI, EntityRole::Terminal)
        }

        fn new(tei: u8, protocol: EntityRole) -> Self {
            Self {
                session: TeiSession::new(&TeiConfig::default(), protocol),
                binding: EntityBinding::new(tei, protocol),
                timers: DeadlineTimers::new(),
                owner: EntityHandle::new(0, 0),
                now: Instant::now(),
            }
        }

        fn run(&mut self, input: SessionInput) -> Vec<SessionAction> {
            let mut ctx =
                SessionContext { owner: self.owner, now: self.now, timers: &mut self.timers };
            let actions = self.session.handle(input, &mut self.binding, &mut ctx);
            assert_eq!(self.session.state().has_timer(), self.session.pending_timer().is_some());
            assert_eq!(self.timers.pending(), usize::from(self.session.pending_timer().is_some()));
            actions
        }

        /// Advances past the session interval and feeds every fired timer back in.
        fn expire(&mut self) -> Vec<SessionAction> {
            self.now += self.session.interval();
            let fired = self.timers.expire(self.now);
            let mut actions = Vec::new();
            for (handle, _) in fired {
                assert!(self.session.owns_timer(handle));
                actions.extend(self.run(SessionInput::TimerExpired));
            }
            actions
        }
    }

    fn sent(actions: &[SessionAction]) -> Vec<TeiMessage> {
        actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::Send(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_assign_sends_single_request() {
        let mut f = Fixture::terminal();
        let actions = f.run(SessionInput::StartAssign);

        let frames = sent(&actions);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message_type, MessageType::IdRequest);
        assert_eq!(frames[0].tei, GROUP_TEI);
        assert_eq!(frames[0].ri, f.session.ri());
        assert!(!frames[0].command);
        assert_eq!(f.session.state(), SessionState::RequestingId);
        assert_eq!(f.session.retries_remaining(), 3);
        assert_eq!(f.session.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_start_assign_noop_when_assigned() {
        let mut f = Fixture::new(80, EntityRole::Network);
        let actions = f.run(SessionInput::StartAssign);
        assert!(actions.is_empty());
        assert_eq!(f.session.state(), SessionState::Idle);
    }

    #[test]
    fn test_request_exhaustion_reports_failure() {
        let mut f = Fixture::terminal();
        f.run(SessionInput::StartAssign);

        let first = f.expire();
        assert_eq!(sent(&first).len(), 1);
        let second = f.expire();
        assert_eq!(sent(&second).len(), 1);
        assert_eq!(f.session.state(), SessionState::RequestingId);

        let third = f.expire();
        assert!(sent(&third).is_empty());
        assert_eq!(third, vec![SessionAction::Notify(Notification::AssignmentFailed)]);
        assert_eq!(f.session.state(), SessionState::Idle);
        assert_eq!(f.binding.tei, GROUP_TEI);
    }

    #[test]
    fn test_retransmit_uses_fresh_ri() {
        let mut f = Fixture::terminal();
        f.run(SessionInput::StartAssign);
        let retransmit = sent(&f.expire());
        assert_eq!(retransmit[0].ri, f.session.ri());
        assert_eq!(f.session.retries_remaining(), 2);
    }

    #[test]
    fn test_matching_assignment_completes() {
        let mut f = Fixture::terminal();
        f.run(SessionInput::StartAssign);
        let ri = f.session.ri();

        let actions = f.run(SessionInput::FrameAssigned { ri, tei: 70, bound: None });
        assert_eq!(actions, vec![SessionAction::Notify(Notification::AssignmentComplete(70))]);
        assert_eq!(f.binding.tei, 70);
        assert_eq!(f.session.state(), SessionState::Idle);
        assert!(f.session.pending_timer().is_none());
    }

    #[test]
    fn test_group_tei_assignment_completes_unassigned() {
        let mut f = Fixture::terminal();
        f.run(SessionInput::StartAssign);
        let ri = f.session.ri();

        let actions = f.run(SessionInput::FrameAssigned { ri, tei: GROUP_TEI, bound: None });
        assert_eq!(
            actions,
            vec![SessionAction::Notify(Notification::AssignmentComplete(GROUP_TEI))]
        );
        assert!(!f.binding.is_assigned());
        assert_eq!(f.session.state(), SessionState::Idle);
    }

    #[test]
    fn test_foreign_assignment_ignored_while_requesting() {
        let mut f = Fixture::terminal();
        f.run(SessionInput::StartAssign);
        let ri = f.session.ri().wrapping_add(1);

        let actions = f.run(SessionInput::FrameAssigned { ri, tei: 70, bound: None });
        assert!(actions.is_empty());
        assert_eq!(f.session.state(), SessionState::RequestingId);
        assert_eq!(f.binding.tei, GROUP_TEI);
    }

    #[test]
    fn test_assignment_of_held_tei_reports_error_on_holder() {
        let mut f = Fixture::terminal();
        f.run(SessionInput::StartAssign);
        let ri = f.session.ri();
        let holder = EntityHandle::new(4, 1);
        let bound = Some(BoundTei { entity: holder, ri: ri.wrapping_add(9) });

        let actions = f.run(SessionInput::FrameAssigned { ri, tei: 70, bound });
        assert_eq!(actions, vec![SessionAction::ReportError(holder)]);
        assert_eq!(f.session.state(), SessionState::RequestingId);
        assert_eq!(f.binding.tei, GROUP_TEI);
    }

    #[test]
    fn test_idle_duplicate_raises_verify_on_holder() {
        let mut f = Fixture::new(66, EntityRole::Terminal);
        let holder = EntityHandle::new(2, 0);
        let bound = Some(BoundTei { entity: holder, ri: 10 });

        let actions = f.run(SessionInput::FrameAssigned { ri: 11, tei: 66, bound });
        assert_eq!(actions, vec![SessionAction::Verify(holder)]);
        assert_eq!(f.session.state(), SessionState::Idle);

        let same_ri = Some(BoundTei { entity: holder, ri: 11 });
        assert!(f.run(SessionInput::FrameAssigned { ri: 11, tei: 66, bound: same_ri }).is_empty());
    }

    #[test]
    fn test_denied_is_documented_noop() {
        let mut f = Fixture::terminal();
        f.run(SessionInput::StartAssign);
        let ri = f.session.ri();

        let actions = f.run(SessionInput::FrameDenied { ri, tei: GROUP_TEI });
        assert!(actions.is_empty());
        assert_eq!(f.session.state(), SessionState::RequestingId);
        assert_eq!(f.session.retries_remaining(), 3);
        assert!(f.session.pending_timer().is_some());
    }

    #[test]
    fn test_verify_exhaustion_requests_removal() {
        let mut f = Fixture::new(90, EntityRole::Terminal);
        let actions = f.run(SessionInput::RequireVerify);
        let frames = sent(&actions);
        assert_eq!(frames, vec![TeiMessage::new(MessageType::IdVerify, 0, 90, false)]);
        assert_eq!(f.session.state(), SessionState::Verifying);
        assert_eq!(f.session.retries_remaining(), 2);

        let retransmit = f.expire();
        assert_eq!(sent(&retransmit).len(), 1);
        assert_eq!(f.session.state(), SessionState::Verifying);

        let last = f.expire();
        assert_eq!(last, vec![SessionAction::Notify(Notification::RemovalRequested)]);
        assert_eq!(f.session.state(), SessionState::Idle);
    }

    #[test]
    fn test_verify_without_tei_is_ignored() {
        let mut f = Fixture::terminal();
        assert!(f.run(SessionInput::RequireVerify).is_empty());
        assert_eq!(f.session.state(), SessionState::Idle);
    }

    #[test]
    fn test_check_request_answers_and_stops_verify() {
        let mut f = Fixture::new(90, EntityRole::Terminal);
        f.run(SessionInput::RequireVerify);

        let actions = f.run(SessionInput::FrameCheckReq { tei: GROUP_TEI });
        let frames = sent(&actions);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message_type, MessageType::IdCheckResponse);
        assert_eq!(frames[0].tei, 90);
        assert_eq!(f.session.state(), SessionState::Idle);
        assert!(f.session.pending_timer().is_none());
    }

    #[test]
    fn test_check_request_for_other_tei_ignored() {
        let mut f = Fixture::new(90, EntityRole::Terminal);
        assert!(f.run(SessionInput::FrameCheckReq { tei: 91 }).is_empty());
    }

    #[test]
    fn test_remove_matching_tei() {
        let mut f = Fixture::new(90, EntityRole::Terminal);
        let actions = f.run(SessionInput::FrameRemove { tei: 90 });
        assert_eq!(actions, vec![SessionAction::Notify(Notification::RemovalRequested)]);
        assert_eq!(f.session.state(), SessionState::Idle);

        let mut unassigned = Fixture::terminal();
        assert!(unassigned.run(SessionInput::FrameRemove { tei: GROUP_TEI }).is_empty());
    }

    #[test]
    fn test_remove_while_verifying_cancels_timer() {
        let mut f = Fixture::new(90, EntityRole::Terminal);
        f.run(SessionInput::RequireVerify);
        let actions = f.run(SessionInput::FrameRemove { tei: GROUP_TEI });
        assert_eq!(actions, vec![SessionAction::Notify(Notification::RemovalRequested)]);
        assert!(f.timers.expire(f.now + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_assign_fixed_replies_on_network_side() {
        let mut f = Fixture::new(64, EntityRole::Network);
        let actions = f.run(SessionInput::StartAssignFixed { ri: 0x1234, ai: GROUP_TEI });
        assert_eq!(
            sent(&actions),
            vec![TeiMessage::new(MessageType::IdAssigned, 0x1234, 64, true)]
        );
        assert_eq!(f.session.ri(), 0x1234);
        assert_eq!(f.session.state(), SessionState::Idle);
        assert_eq!(f.session.interval(), Duration::from_secs(2));

        let mut terminal = Fixture::new(64, EntityRole::Terminal);
        assert!(terminal.run(SessionInput::StartAssignFixed { ri: 1, ai: 127 }).is_empty());
    }

    #[test]
    fn test_unlisted_events_ignored() {
        let mut f = Fixture::terminal();
        assert!(f.run(SessionInput::TimerExpired).is_empty());
        assert!(f.run(SessionInput::FrameDenied { ri: 1, tei: 1 }).is_empty());

        f.run(SessionInput::StartAssign);
        assert!(f.run(SessionInput::StartAssign).is_empty());
        assert!(f.run(SessionInput::FrameRemove { tei: GROUP_TEI }).is_empty());
        assert!(f.run(SessionInput::RequireVerify).is_empty());
        assert_eq!(f.session.state(), SessionState::RequestingId);
    }

    #[test]
    fn test_binding_flags() {
        let ptp = EntityBinding::new(0, EntityRole::Terminal);
        assert!(ptp.fixed && ptp.is_point_to_point() && ptp.ignores_management());

        let dynamic = EntityBinding::new(GROUP_TEI, EntityRole::Terminal);
        assert!(!dynamic.fixed && !dynamic.is_assigned());
        assert!(!dynamic.addressed_by(GROUP_TEI));

        let net_fixed = EntityBinding::new(12, EntityRole::Network);
        assert!(net_fixed.fixed && !net_fixed.ignores_management());
    }
}
