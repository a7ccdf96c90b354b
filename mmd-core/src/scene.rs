mod component;
mod entity;
mod environment;
mod object_id;
mod object_id_allocator;

pub use component::*;
pub use entity::*;
pub use environment::*;
pub use object_id::*;
pub use object_id_allocator::*;
