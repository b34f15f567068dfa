pub mod implement;
pub mod inspect;
pub mod list;
pub mod util;

pub use implement::*;
pub use inspect::*;
pub use list::*;
pub use util::*;
