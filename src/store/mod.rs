pub mod curator;
pub mod projection;
pub mod quarantine;
pub mod range;
pub mod session;

pub use curator::*;
pub use projection::*;
pub use range::*;
pub use session::*;
