use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    num::NonZeroU32,
};

/// Stable handle of a scene entity. Keys side tables instead of object identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(NonZeroU32);

impl ObjectId {
    pub(crate) fn new(id: NonZeroU32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> NonZeroU32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "#{}", self.0)
    }
}
