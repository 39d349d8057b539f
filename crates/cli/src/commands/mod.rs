pub mod extract;
pub mod mine;
pub mod resolve;
pub mod status;

pub use extract::*;
pub use mine::*;
pub use resolve::*;
pub use status::*;
