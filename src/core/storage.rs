use crate::bodies::RigidBody;
use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::Result;

/// Insertion-ordered storage for the bodies owned by an environment.
///
/// Bodies are kept in registration order so that every traversal the
/// simulation performs (collision detection, integration, contact
/// solving) visits them in the same deterministic sequence. Lookups are
/// linear searches; body counts stay small enough that this beats a hash
/// map in practice.
#[derive(Debug, Default)]
pub struct BodyStorage {
    items: Vec<(BodyHandle, RigidBody)>,
    next_id: u32,
}

impl BodyStorage {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            next_id: 1, // 0 is reserved so it can stand for "no handle"
        }
    }

    /// Takes ownership of a body and returns its handle. Handles are
    /// never reused.
    pub fn add(&mut self, body: RigidBody) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.items.push((handle, body));
        handle
    }

    /// Removes a body and returns it, keeping the insertion order of the
    /// remaining bodies intact
    pub fn remove(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let index = self.index_of(handle)?;
        Some(self.items.remove(index).1)
    }

    fn index_of(&self, handle: BodyHandle) -> Option<usize> {
        self.items.iter().position(|(h, _)| *h == handle)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.items
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, body)| body)
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.items
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .map(|(_, body)| body)
    }

    /// Gets a body by its handle, reporting an error if not found
    pub fn get_body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        self.get(handle)
            .ok_or(PhysicsError::BodyNotFound(handle.0))
    }

    /// Gets a mutable reference to a body by its handle, reporting an
    /// error if not found
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody> {
        self.get_mut(handle)
            .ok_or(PhysicsError::BodyNotFound(handle.0))
    }

    /// Mutable references to two distinct bodies at once, as the contact
    /// solver needs. Returns `None` if either handle is unknown or both
    /// handles name the same body.
    pub fn pair_mut(
        &mut self,
        handle0: BodyHandle,
        handle1: BodyHandle,
    ) -> Option<(&mut RigidBody, &mut RigidBody)> {
        let i0 = self.index_of(handle0)?;
        let i1 = self.index_of(handle1)?;

        if i0 < i1 {
            let (head, tail) = self.items.split_at_mut(i1);
            Some((&mut head[i0].1, &mut tail[0].1))
        } else if i1 < i0 {
            let (head, tail) = self.items.split_at_mut(i0);
            Some((&mut tail[0].1, &mut head[i1].1))
        } else {
            None
        }
    }

    /// Handle and body at a position in registration order. Panics if
    /// `index` is out of range.
    pub fn at(&self, index: usize) -> (BodyHandle, &RigidBody) {
        let (handle, body) = &self.items[index];
        (*handle, body)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.items.iter().map(|(h, body)| (*h, body))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut RigidBody)> {
        self.items.iter_mut().map(|(h, body)| (*h, body))
    }
}
