pub use peercall_core::model::PeerId;

pub mod model {
    pub use peercall_core::model::*;
}

pub mod codec {
    pub use peercall_core::codec::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use peercall_client::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use peercall_relay::*;
}
