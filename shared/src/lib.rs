pub mod member;
pub mod tickets;

pub use member::*;
pub use tickets::*;
