pub mod query;
pub mod record;
pub mod result;

pub use query::*;
pub use record::*;
pub use result::*;
