/// Events raised by a relay channel, delivered in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Connected,
    Message(String),
    Disconnected,
    Error(String),
}
