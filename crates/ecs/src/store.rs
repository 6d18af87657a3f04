use scenekit_common::EntityId;
use serde::{Deserialize, Serialize};

use crate::components::{
    AnimationState, MeshRef, NpcController, PlayerController, Transform, Velocity,
};
use crate::table::ComponentTable;

/// Identifies a component type in store events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Transform,
    Velocity,
    MeshRef,
    PlayerController,
    NpcController,
    AnimationState,
}

/// Structural changes recorded by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreEvent {
    Created { entity: EntityId },
    Destroyed { entity: EntityId },
    Attached {
        entity: EntityId,
        kind: ComponentKind,
        replaced: bool,
    },
    Detached { entity: EntityId, kind: ComponentKind },
}

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("entity {0} is not alive")]
    StaleEntity(EntityId),
}

/// One table per component type. Fields are public so systems can borrow
/// several tables mutably at once and join them.
#[derive(Debug, Default)]
pub struct Tables {
    pub transforms: ComponentTable<Transform>,
    pub velocities: ComponentTable<Velocity>,
    pub meshes: ComponentTable<MeshRef>,
    pub players: ComponentTable<PlayerController>,
    pub npcs: ComponentTable<NpcController>,
    pub animations: ComponentTable<AnimationState>,
}

impl Tables {
    fn remove_all(&mut self, entity: EntityId) -> Vec<ComponentKind> {
        let mut removed = Vec::new();
        if self.transforms.remove(entity).is_some() {
            removed.push(ComponentKind::Transform);
        }
        if self.velocities.remove(entity).is_some() {
            removed.push(ComponentKind::Velocity);
        }
        if self.meshes.remove(entity).is_some() {
            removed.push(ComponentKind::MeshRef);
        }
        if self.players.remove(entity).is_some() {
            removed.push(ComponentKind::PlayerController);
        }
        if self.npcs.remove(entity).is_some() {
            removed.push(ComponentKind::NpcController);
        }
        if self.animations.remove(entity).is_some() {
            removed.push(ComponentKind::AnimationState);
        }
        removed
    }
}

/// A component type the store knows how to route to its table.
pub trait Component: Sized + 'static {
    const KIND: ComponentKind;

    fn table(tables: &Tables) -> &ComponentTable<Self>;
    fn table_mut(tables: &mut Tables) -> &mut ComponentTable<Self>;
}

macro_rules! component {
    ($ty:ty, $field:ident, $kind:ident) => {
        impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$kind;

            fn table(tables: &Tables) -> &ComponentTable<Self> {
                &tables.$field
            }

            fn table_mut(tables: &mut Tables) -> &mut ComponentTable<Self> {
                &mut tables.$field
            }
        }
    };
}

component!(Transform, transforms, Transform);
component!(Velocity, velocities, Velocity);
component!(MeshRef, meshes, MeshRef);
component!(PlayerController, players, PlayerController);
component!(NpcController, npcs, NpcController);
component!(AnimationState, animations, AnimationState);

#[derive(Debug, Clone, Copy)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Entity allocator plus component tables.
///
/// Ids are generational: destroying an entity bumps its slot's generation
/// before the slot is reused, so stale ids are rejected rather than
/// aliasing the new occupant.
#[derive(Debug, Default)]
pub struct EntityStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    tables: Tables,
    events: Vec<StoreEvent>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id, reusing a retired slot with a bumped generation.
    pub fn create(&mut self) -> EntityId {
        let entity = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.alive = true;
                EntityId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    alive: true,
                });
                EntityId::new(index, 0)
            }
        };
        self.live += 1;
        tracing::trace!(%entity, "entity created");
        self.events.push(StoreEvent::Created { entity });
        entity
    }

    /// Remove every component of `entity` and retire its id.
    pub fn destroy(&mut self, entity: EntityId) -> Result<(), StoreError> {
        if !self.is_alive(entity) {
            return Err(StoreError::StaleEntity(entity));
        }
        for kind in self.tables.remove_all(entity) {
            self.events.push(StoreEvent::Detached { entity, kind });
        }
        let slot = &mut self.slots[entity.index() as usize];
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(entity.index());
        self.live -= 1;
        tracing::trace!(%entity, "entity destroyed");
        self.events.push(StoreEvent::Destroyed { entity });
        Ok(())
    }

    /// Whether `entity` is live in this store (stale generations are not).
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.slots
            .get(entity.index() as usize)
            .is_some_and(|slot| slot.alive && slot.generation == entity.generation())
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.live
    }

    /// Live entity ids in index order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.alive)
            .map(|(index, slot)| EntityId::new(index as u32, slot.generation))
    }

    /// Attach or overwrite a component. Attaching to a dead entity is
    /// ignored.
    pub fn attach<T: Component>(&mut self, entity: EntityId, value: T) {
        if !self.is_alive(entity) {
            tracing::warn!(%entity, kind = ?T::KIND, "attach to stale entity ignored");
            return;
        }
        let replaced = T::table_mut(&mut self.tables)
            .insert(entity, value)
            .is_some();
        tracing::trace!(%entity, kind = ?T::KIND, replaced, "component attached");
        self.events.push(StoreEvent::Attached {
            entity,
            kind: T::KIND,
            replaced,
        });
    }

    /// Remove a component, returning it if it was present.
    pub fn detach<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        let removed = T::table_mut(&mut self.tables).remove(entity);
        if removed.is_some() {
            self.events.push(StoreEvent::Detached {
                entity,
                kind: T::KIND,
            });
        }
        removed
    }

    /// Component of type `T` on `entity`, if attached.
    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        T::table(&self.tables).get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        T::table_mut(&mut self.tables).get_mut(entity)
    }

    /// Whether `entity` carries a `T`.
    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        T::table(&self.tables).contains(entity)
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Mutable tables for systems that need disjoint borrows.
    pub fn tables_mut(&mut self) -> &mut Tables {
        &mut self.tables
    }

    /// Read-only access to pending events.
    pub fn events(&self) -> &[StoreEvent] {
        &self.events
    }

    /// Drain and return all pending events.
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }
}
