pub mod codec;
pub mod model;
pub mod utils;

pub use codec::{CodecError, decode, encode};
pub use model::*;
