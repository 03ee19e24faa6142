pub mod list;
pub mod unpack;

pub use list::*;
pub use unpack::*;
