mod cache;
mod secure;

pub use cache::*;
pub use secure::*;
