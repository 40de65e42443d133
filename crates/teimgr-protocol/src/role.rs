use crate::message::Direction;

/// Side(s) of the point-to-multipoint link a manager serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Network side: accepts terminal-originated messages.
    Network,
    /// Terminal (user) side: accepts network-originated messages.
    Terminal,
    /// Both sides on one device, e.g. a loopback or test rig.
    Both,
}

impl Role {
    /// Returns true if a message travelling in `direction` is processed by this role.
    pub fn accepts(&self, direction: Direction) -> bool {
        match (self, direction) {
            (Role::Both, _) => true,
            (Role::Network, Direction::FromTerminal) => true,
            (Role::Terminal, Direction::FromNetwork) => true,
            _ => false,
        }
    }

    /// Returns true if entities running `protocol` may be created under this role.
    pub fn supports(&self, protocol: EntityRole) -> bool {
        match (self, protocol) {
            (Role::Both, _) => true,
            (Role::Network, EntityRole::Network) => true,
            (Role::Terminal, EntityRole::Terminal) => true,
            _ => false,
        }
    }

    /// Returns true if this role may originate network-side frames (UI data, assignments).
    pub fn is_network(&self) -> bool {
        matches!(self, Role::Network | Role::Both)
    }
}

/// Protocol side run by a single layer-2 entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRole {
    /// LAPD network side (NT).
    Network,
    /// LAPD terminal side (TE).
    Terminal,
}

impl EntityRole {
    /// Command/response bit value for frames this side originates.
    pub fn command_bit(&self) -> bool {
        matches!(self, EntityRole::Network)
    }

    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            EntityRole::Network => "LAPD-NT",
            EntityRole::Terminal => "LAPD-TE",
        }
    }
}
