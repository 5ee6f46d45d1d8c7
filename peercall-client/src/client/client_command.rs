/// Requests from the application, applied on the signaling sequence in the
/// order they were sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Join { room: String, username: String },
    StartCall,
    HangUp,
    Leave,
    Shutdown,
}
