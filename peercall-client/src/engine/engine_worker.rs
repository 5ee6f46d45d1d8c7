use crate::engine::{
    DescriptionSide, EngineCommand, EngineEvent, EngineEventSender, MediaEngine, SessionId,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Runs engine commands for one session strictly in submission order and
/// reports each completion as an [`EngineEvent`].
pub struct EngineWorker {
    session: SessionId,
    engine: Arc<dyn MediaEngine>,
    cmd_tx: mpsc::UnboundedSender<EngineCommand>,
    task: JoinHandle<()>,
}

impl EngineWorker {
    pub fn spawn(engine: Arc<dyn MediaEngine>, events: EngineEventSender) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let session = events.session();
        let task = tokio::spawn(Self::run(engine.clone(), cmd_rx, events));

        Self {
            session,
            engine,
            cmd_tx,
            task,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn submit(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            warn!("Engine worker for session {} is gone", self.session);
        }
    }

    /// Stops executing queued commands and releases the engine.
    pub async fn shutdown(self) {
        self.task.abort();
        self.engine.close().await;
        debug!("Engine for session {} released", self.session);
    }

    async fn run(
        engine: Arc<dyn MediaEngine>,
        mut cmd_rx: mpsc::UnboundedReceiver<EngineCommand>,
        events: EngineEventSender,
    ) {
        while let Some(cmd) = cmd_rx.recv().await {
            let event = match cmd {
                EngineCommand::CreateOffer => {
                    EngineEvent::OfferCreated(engine.create_offer().await)
                }
                EngineCommand::CreateAnswer => {
                    EngineEvent::AnswerCreated(engine.create_answer().await)
                }
                EngineCommand::SetLocalDescription(desc) => EngineEvent::DescriptionSet {
                    side: DescriptionSide::Local,
                    result: engine.set_local_description(desc).await,
                },
                EngineCommand::SetRemoteDescription(desc) => EngineEvent::DescriptionSet {
                    side: DescriptionSide::Remote,
                    result: engine.set_remote_description(desc).await,
                },
                EngineCommand::AddRemoteCandidate(candidate) => {
                    EngineEvent::CandidateAdded(engine.add_remote_candidate(candidate).await)
                }
            };

            if !events.send(event) {
                break;
            }
        }
    }
}
