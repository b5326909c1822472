pub mod jsonpaths;
pub mod record;

pub use jsonpaths::*;
pub use record::*;
