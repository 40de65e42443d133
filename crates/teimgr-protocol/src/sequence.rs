use teimgr_core::{
    constants::{CORRELATION_SEQUENCE_LIMIT, GROUP_TEI, TEI_SAPI},
    transport::CorrelationId,
};

/// Generator of local correlation identifiers for frames handed to the link.
///
/// The sequence runs 1, 2, .. 0x7ffe and then starts again at 1.
#[derive(Debug)]
pub struct IdSequence {
    next: u16,
}

impl IdSequence {
    /// Creates a sequence starting at 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Sequence value the next call to [`IdSequence::next_id`] will use.
    pub fn peek(&self) -> u16 {
        self.next
    }

    /// Returns the next identifier: `sequence << 16 | GROUP_TEI << 8 | SAPI`.
    pub fn next_id(&mut self) -> CorrelationId {
        let sequence = self.next;
        self.next = sequence_after(sequence);
        CorrelationId::from_raw(
            (u32::from(sequence) << 16) | (u32::from(GROUP_TEI) << 8) | u32::from(TEI_SAPI),
        )
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Advances a correlation sequence value with wraparound at [`CORRELATION_SEQUENCE_LIMIT`].
pub fn sequence_after(sequence: u16) -> u16 {
    let next = sequence.wrapping_add(1);
    if next >= CORRELATION_SEQUENCE_LIMIT || next == 0 {
        1
    } else {
        next
    }
}
