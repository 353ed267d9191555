//! World entities as a closed tagged set.
//!
//! One enum of entity kinds and an id-keyed registry replace the old
//! GameObject class hierarchy and its name-string type checks. Picking out
//! "all enemies" is a filter over the tag. The renderer never touches
//! entity state; it only reads the `Sprite` view.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u32);

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Enemy { health: i32, speed: f64 },
    Item { heal: i32 },
    Projectile { vel_x: f64, vel_y: f64, ttl: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub x: f64,
    pub y: f64,
    /// Half-extent of the billboard in world units.
    pub half_size: f64,
    pub texture: char,
    pub kind: EntityKind,
}

/// What the renderer reads per entity: position, size and texture only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub x: f64,
    pub y: f64,
    pub half_size: f64,
    pub texture: char,
}

#[derive(Debug, Default)]
pub struct EntityRegistry {
    next_id: u32,
    entities: Vec<(EntityId, Entity)>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push((id, entity));
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let at = self.entities.iter().position(|(eid, _)| *eid == id)?;
        Some(self.entities.remove(at).1)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, e)| e)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|(eid, _)| *eid == id)
            .map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(id, e)| (*id, e))
    }

    pub fn enemies(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.iter()
            .filter(|(_, e)| matches!(e.kind, EntityKind::Enemy { .. }))
    }

    pub fn items(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.iter()
            .filter(|(_, e)| matches!(e.kind, EntityKind::Item { .. }))
    }

    pub fn projectiles(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.iter()
            .filter(|(_, e)| matches!(e.kind, EntityKind::Projectile { .. }))
    }

    /// Snapshot of the renderable view of every entity.
    pub fn sprites(&self) -> Vec<Sprite> {
        self.entities
            .iter()
            .map(|(_, e)| Sprite {
                x: e.x,
                y: e.y,
                half_size: e.half_size,
                texture: e.texture,
            })
            .collect()
    }
}
