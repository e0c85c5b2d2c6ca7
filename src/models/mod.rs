mod collection;
mod message;
mod request;

pub use collection::*;
pub use message::*;
pub use request::*;
