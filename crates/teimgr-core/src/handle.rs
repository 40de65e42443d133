use std::fmt;

/// Stable reference to a layer-2 entity registered with a link manager.
///
/// The generation changes every time a slot is reused, so a handle kept after
/// its entity was destroyed never resolves to a newer entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    /// Creates a handle from an arena slot and its generation.
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the owning registry.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l2#{}.{}", self.index, self.generation)
    }
}
