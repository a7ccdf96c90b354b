use super::ObjectId;
use std::num::NonZeroU32;

/// Issues object ids, reusing released ones first.
#[derive(Debug)]
pub struct ObjectIdAllocator {
    next_id: NonZeroU32,
    free_ids: Vec<NonZeroU32>,
}

impl ObjectIdAllocator {
    pub fn new() -> Self {
        Self {
            next_id: NonZeroU32::MIN,
            free_ids: Vec::new(),
        }
    }

    /// Returns `None` once every id is in use.
    pub fn allocate(&mut self) -> Option<ObjectId> {
        let id = match self.free_ids.pop() {
            Some(id) => id,
            None => {
                let id = self.next_id;
                self.next_id = self.next_id.checked_add(1)?;
                id
            }
        };

        Some(ObjectId::new(id))
    }

    pub fn deallocate(&mut self, id: ObjectId) {
        self.free_ids.push(id.get());
    }
}

impl Default for ObjectIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
