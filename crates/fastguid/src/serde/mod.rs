mod guid;

pub use guid::*;
