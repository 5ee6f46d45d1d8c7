use crate::engine::{EngineEvent, EngineEventSender, MediaEngine, MediaEngineFactory, RemoteStream};
use crate::error::{EngineError, ResourceError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use peercall_core::{IceCandidateDescriptor, IceServerConfig, SdpKind, SessionDescriptor};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine as RtcMediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_remote::TrackRemote;

#[derive(Debug, Clone)]
pub struct WebRtcEngineConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for WebRtcEngineConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::default()],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WebRtcEngineFactory {
    config: WebRtcEngineConfig,
}

impl WebRtcEngineFactory {
    pub fn new(config: WebRtcEngineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MediaEngineFactory for WebRtcEngineFactory {
    async fn create(
        &self,
        events: EngineEventSender,
    ) -> Result<Arc<dyn MediaEngine>, ResourceError> {
        let engine = WebRtcEngine::new(&self.config, events)
            .await
            .map_err(|e| ResourceError(format!("{:#}", e)))?;
        Ok(Arc::new(engine))
    }
}

/// Media engine backed by one webrtc-rs peer connection with an audio and a
/// video transceiver.
pub struct WebRtcEngine {
    peer_connection: Arc<RTCPeerConnection>,
    /// Remote candidates that arrived before the remote description.
    early_candidates: Mutex<Vec<RTCIceCandidateInit>>,
}

impl WebRtcEngine {
    pub async fn new(config: &WebRtcEngineConfig, events: EngineEventSender) -> Result<Self> {
        let mut media_engine = RtcMediaEngine::default();
        media_engine.register_default_codecs()?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        for kind in [RTPCodecType::Audio, RTPCodecType::Video] {
            peer_connection
                .add_transceiver_from_kind(kind, None)
                .await
                .context("Failed to add media transceiver")?;
        }

        let session = events.session();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                Box::pin(async move {
                    info!("Peer connection state for session {}: {}", session, s);
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                events.send(EngineEvent::LocalCandidate(IceCandidateDescriptor::new(
                    init.candidate,
                    init.sdp_mid,
                    init.sdp_mline_index.map(i32::from),
                )));
            })
        }));

        let track_events = events;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let events = track_events.clone();

                Box::pin(async move {
                    let kind = match track.kind() {
                        RTPCodecType::Audio => "audio",
                        RTPCodecType::Video => "video",
                        _ => "unspecified",
                    };
                    events.send(EngineEvent::RemoteStreamAdded(RemoteStream {
                        stream_id: track.stream_id(),
                        track_id: track.id(),
                        kind: kind.to_owned(),
                    }));
                })
            },
        ));

        Ok(Self {
            peer_connection,
            early_candidates: Mutex::new(Vec::new()),
        })
    }

    async fn apply_candidate(&self, candidate: RTCIceCandidateInit) -> Result<(), EngineError> {
        self.peer_connection
            .add_ice_candidate(candidate)
            .await
            .map_err(engine_error)
    }
}

#[async_trait]
impl MediaEngine for WebRtcEngine {
    async fn create_offer(&self) -> Result<SessionDescriptor, EngineError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(engine_error)?;
        Ok(SessionDescriptor::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescriptor, EngineError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(engine_error)?;
        Ok(SessionDescriptor::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescriptor) -> Result<(), EngineError> {
        self.peer_connection
            .set_local_description(to_rtc(desc)?)
            .await
            .map_err(engine_error)
    }

    async fn set_remote_description(&self, desc: SessionDescriptor) -> Result<(), EngineError> {
        self.peer_connection
            .set_remote_description(to_rtc(desc)?)
            .await
            .map_err(engine_error)?;

        let early: Vec<_> = self.early_candidates.lock().await.drain(..).collect();
        if !early.is_empty() {
            debug!("Applying {} buffered remote candidates", early.len());
        }
        for candidate in early {
            if let Err(e) = self.apply_candidate(candidate).await {
                warn!("Failed to add buffered ICE candidate: {}", e);
            }
        }
        Ok(())
    }

    async fn add_remote_candidate(
        &self,
        candidate: IceCandidateDescriptor,
    ) -> Result<(), EngineError> {
        let sdp_mline_index = match candidate.sdp_m_line_index {
            Some(index) => Some(u16::try_from(index).map_err(|_| {
                EngineError(format!("m-line index {} out of range", index))
            })?),
            None => None,
        };
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index,
            ..Default::default()
        };

        if self.peer_connection.remote_description().await.is_none() {
            self.early_candidates.lock().await.push(init);
            return Ok(());
        }
        self.apply_candidate(init).await
    }

    async fn close(&self) {
        if let Err(e) = self.peer_connection.close().await {
            warn!("Failed to close peer connection: {}", e);
        }
    }
}

fn to_rtc(desc: SessionDescriptor) -> Result<RTCSessionDescription, EngineError> {
    match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.body),
        SdpKind::Answer => RTCSessionDescription::answer(desc.body),
    }
    .map_err(engine_error)
}

fn engine_error(e: webrtc::Error) -> EngineError {
    EngineError(e.to_string())
}
