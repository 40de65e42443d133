//! Entity arena for one link.

use teimgr_core::{
    config::TeiConfig,
    constants::{GROUP_TEI, TEI_SAPI},
    handle::EntityHandle,
};
use teimgr_protocol::EntityRole;
use teimgr_session::{EntityBinding, TeiSession};

/// Parameters of a layer-2 entity to register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRequest {
    /// Protocol side the entity runs.
    pub protocol: EntityRole,
    /// Service access point; only the management SAPI is supported.
    pub sapi: u8,
    /// Requested TEI: fixed (< 64) or [`GROUP_TEI`] to negotiate one.
    pub tei: u8,
}

impl ChannelRequest {
    /// Terminal-side entity on SAPI 0.
    pub fn terminal(tei: u8) -> Self {
        Self { protocol: EntityRole::Terminal, sapi: TEI_SAPI, tei }
    }

    /// Network-side entity on SAPI 0.
    pub fn network(tei: u8) -> Self {
        Self { protocol: EntityRole::Network, sapi: TEI_SAPI, tei }
    }

    /// Terminal-side entity that will negotiate its TEI.
    pub fn dynamic_terminal() -> Self {
        Self::terminal(GROUP_TEI)
    }
}

/// A registered layer-2 entity and the TEI session it owns.
#[derive(Debug)]
pub struct Layer2Entity {
    pub(crate) binding: EntityBinding,
    sapi: u8,
    pub(crate) session: TeiSession,
}

impl Layer2Entity {
    pub(crate) fn new(request: ChannelRequest, config: &TeiConfig) -> Self {
        Self {
            binding: EntityBinding::new(request.tei, request.protocol),
            sapi: request.sapi,
            session: TeiSession::new(config, request.protocol),
        }
    }

    /// Current TEI, [`GROUP_TEI`] while unassigned.
    pub fn tei(&self) -> u8 {
        self.binding.tei
    }

    /// Service access point.
    pub fn sapi(&self) -> u8 {
        self.sapi
    }

    /// Returns true for administratively pinned TEIs.
    pub fn is_fixed(&self) -> bool {
        self.binding.fixed
    }

    /// Returns true for the point-to-point TEI 0.
    pub fn is_point_to_point(&self) -> bool {
        self.binding.is_point_to_point()
    }

    /// Protocol side.
    pub fn protocol(&self) -> EntityRole {
        self.binding.protocol
    }

    /// TEI binding.
    pub fn binding(&self) -> &EntityBinding {
        &self.binding
    }

    /// TEI management session.
    pub fn session(&self) -> &TeiSession {
        &self.session
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entity: Option<Layer2Entity>,
}

/// Generational arena of entities addressed by [`EntityHandle`].
#[derive(Debug, Default)]
pub struct EntityRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl EntityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entity and returns its handle. Freed slots are reused under a new generation.
    pub fn insert(&mut self, entity: Layer2Entity) -> EntityHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entity = Some(entity);
            return EntityHandle::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, entity: Some(entity) });
        EntityHandle::new(index, 0)
    }

    /// Removes the entity behind `handle`; stale handles yield `None`.
    pub fn remove(&mut self, handle: EntityHandle) -> Option<Layer2Entity> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.len -= 1;
        Some(entity)
    }

    /// Looks up a live entity.
    pub fn get(&self, handle: EntityHandle) -> Option<&Layer2Entity> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.entity.as_ref())
    }

    /// Looks up a live entity mutably.
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Layer2Entity> {
        self.slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.entity.as_mut())
    }

    /// Returns true if `handle` refers to a live entity.
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no entity is registered.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &Layer2Entity)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entity
                .as_ref()
                .map(|entity| (EntityHandle::new(index as u32, slot.generation), entity))
        })
    }

    /// Handles of all live entities in slot order.
    pub fn handles(&self) -> Vec<EntityHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// First entity on the management SAPI bound to `tei`.
    ///
    /// The group TEI and the point-to-point TEI 0 never match.
    pub fn find_by_tei(&self, tei: u8) -> Option<EntityHandle> {
        self.find_bound(tei, |_| true)
    }

    /// Like [`EntityRegistry::find_by_tei`], restricted to entities running `protocol`.
    pub fn find_by_tei_on(&self, tei: u8, protocol: EntityRole) -> Option<EntityHandle> {
        self.find_bound(tei, |entity| entity.protocol() == protocol)
    }

    fn find_bound(
        &self,
        tei: u8,
        filter: impl Fn(&Layer2Entity) -> bool,
    ) -> Option<EntityHandle> {
        if tei == GROUP_TEI || tei == 0 {
            return None;
        }
        self.iter()
            .find(|(_, entity)| entity.sapi == TEI_SAPI && entity.tei() == tei && filter(*entity))
            .map(|(handle, _)| handle)
    }
}
