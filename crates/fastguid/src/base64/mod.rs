mod formatter;
mod url;

pub use formatter::*;
pub use url::*;
