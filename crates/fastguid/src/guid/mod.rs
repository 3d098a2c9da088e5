mod guid;
mod sortable;

pub use guid::*;
pub use sortable::*;
