/// TEI management state of one layer-2 entity.
///
/// An entity rests in `Idle` whether or not it holds a TEI; the two other states
/// each own exactly one running retransmission timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No procedure in progress
    #[default]
    Idle,

    /// Terminal: sent ID_REQUEST, waiting for ID_ASSIGNED
    RequestingId,

    /// Sent ID_VERIFY, waiting for the network to check the TEI
    Verifying,
}

impl SessionState {
    /// Returns true if a retransmission timer must be running in this state
    pub fn has_timer(&self) -> bool {
        matches!(self, SessionState::RequestingId | SessionState::Verifying)
    }

    /// Short state name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "ST_TEI_NOP",
            SessionState::RequestingId => "ST_TEI_IDREQ",
            SessionState::Verifying => "ST_TEI_IDVERIFY",
        }
    }
}
