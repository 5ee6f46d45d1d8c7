use crate::client::ClientCommand;
use crate::error::SignalingError;
use tokio::sync::mpsc;

/// Cloneable front door to a running [`SignalingClient`](crate::SignalingClient).
#[derive(Debug, Clone)]
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
}

impl ClientHandle {
    pub(crate) fn new(cmd_tx: mpsc::Sender<ClientCommand>) -> Self {
        Self { cmd_tx }
    }

    pub async fn join(
        &self,
        room: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<(), SignalingError> {
        self.send(ClientCommand::Join {
            room: room.into(),
            username: username.into(),
        })
        .await
    }

    pub async fn start_call(&self) -> Result<(), SignalingError> {
        self.send(ClientCommand::StartCall).await
    }

    pub async fn hang_up(&self) -> Result<(), SignalingError> {
        self.send(ClientCommand::HangUp).await
    }

    pub async fn leave(&self) -> Result<(), SignalingError> {
        self.send(ClientCommand::Leave).await
    }

    pub async fn shutdown(&self) -> Result<(), SignalingError> {
        self.send(ClientCommand::Shutdown).await
    }

    pub fn is_running(&self) -> bool {
        !self.cmd_tx.is_closed()
    }

    async fn send(&self, cmd: ClientCommand) -> Result<(), SignalingError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SignalingError::ClientGone)
    }
}
