//! One client connection, from handshake to disconnect.

use crate::context::ServerContext;
use crate::error::SessionError;
use crate::handlers::{self, Action, SessionData};
use crate::keep_alive::KeepAlive;
use bytes::BytesMut;
use limbo_protocol_core::{
    Connection, ConnectionError, ConnectionState, FrameCodec, InternalPacket, ProtocolVersion,
    TimeoutError,
};
use limbo_types::TextComponent;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

enum Event {
    Frame(Result<BytesMut, ConnectionError>),
    Heartbeat,
}

pub struct Session<S> {
    ctx: Arc<ServerContext>,
    conn: Connection<S>,
    data: SessionData,
    keep_alive: Option<KeepAlive>,
    /// Whether the player reached Play, for the join and leave log lines.
    joined: bool,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(ctx: Arc<ServerContext>, stream: S, peer: SocketAddr) -> Self {
        let default_version = ctx.protocol.newest().unwrap_or(ProtocolVersion::V1_21);
        let conn = Connection::new(stream, FrameCodec::new(ctx.settings.max_frame_length));
        Self {
            ctx,
            conn,
            data: SessionData::new(peer, default_version),
            keep_alive: None,
            joined: false,
        }
    }

    /// Serve the connection until either side ends it. Never fails: errors
    /// are reported to the client where the protocol allows, then logged.
    pub async fn run(mut self) {
        if let Err(e) = self.drive().await {
            if e.can_notify() {
                if let Some(state) = self.disconnect_state() {
                    let reason = e.reason();
                    if let Err(send_err) = self.send_disconnect(state, reason).await {
                        trace!("Could not notify {}: {}", self.data.display_name(), send_err);
                    }
                }
            }
            if self.joined {
                info!("{} lost connection: {}", self.data.display_name(), e);
            } else {
                debug!("Connection {} ended: {}", self.data.peer, e);
            }
        }

        // Frees the player slot before the count is logged.
        self.data.slot = None;
        if self.joined {
            info!("{} left the game ({} online)", self.data.display_name(), self.ctx.online());
        }
        if let Err(e) = self.conn.shutdown().await {
            trace!("Shutdown of {} failed: {}", self.data.peer, e);
        }
    }

    async fn drive(&mut self) -> Result<(), SessionError> {
        while !self.data.state.is_closed() {
            let frame = self.next_frame().await?;
            let packet = match self
                .ctx
                .protocol
                .decode(self.data.version, self.data.state, frame)
            {
                Ok(packet) => packet,
                Err(e) => {
                    let e = SessionError::from(e);
                    if e.is_fatal(self.data.state) {
                        return Err(e);
                    }
                    warn!("Dropping malformed packet from {}: {}", self.data.display_name(), e);
                    continue;
                }
            };
            trace!("{} -> {:?}", self.data.display_name(), packet.name());
            let actions = self.dispatch(packet)?;
            self.apply(actions).await?;
        }
        Ok(())
    }

    /// Wait for the next frame, answering heartbeats in the meantime. Before
    /// keep-alives start, silence is bounded by the login timeout.
    async fn next_frame(&mut self) -> Result<BytesMut, SessionError> {
        loop {
            let event = match self.keep_alive.as_mut() {
                Some(keep_alive) => tokio::select! {
                    frame = self.conn.read_frame() => Event::Frame(frame),
                    _ = keep_alive.tick() => Event::Heartbeat,
                },
                None => {
                    let limit = self.ctx.settings.login_timeout;
                    match timeout(limit, self.conn.read_frame()).await {
                        Ok(frame) => Event::Frame(frame),
                        Err(_) => {
                            return Err(TimeoutError::Idle {
                                state: self.data.state,
                                limit,
                            }
                            .into())
                        }
                    }
                }
            };

            match event {
                Event::Frame(frame) => return Ok(frame?),
                Event::Heartbeat => {
                    let id = match self.keep_alive.as_mut() {
                        Some(keep_alive) => keep_alive.on_tick()?,
                        None => None,
                    };
                    if let Some(id) = id {
                        trace!("Keep-alive {} to {}", id, self.data.display_name());
                        self.send(self.data.state, &InternalPacket::KeepAlive { id })
                            .await?;
                        self.flush().await?;
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, packet: InternalPacket) -> Result<Vec<Action>, SessionError> {
        if let (InternalPacket::KeepAliveResponse { id }, Some(keep_alive)) =
            (&packet, self.keep_alive.as_mut())
        {
            if !keep_alive.on_response(*id) {
                trace!("Ignoring stale keep-alive {} from {}", id, self.data.display_name());
            }
            return Ok(Vec::new());
        }

        let ctx = self.ctx.as_ref();
        let data = &mut self.data;
        match data.state {
            ConnectionState::Handshake => handlers::handshake::handle(ctx, data, packet),
            ConnectionState::Status => handlers::status::handle(ctx, data, packet),
            ConnectionState::Login => handlers::login::handle(ctx, data, packet),
            ConnectionState::Configuration => handlers::configuration::handle(ctx, data, packet),
            ConnectionState::Play => handlers::play::handle(ctx, data, packet),
            ConnectionState::Closed => Ok(Vec::new()),
        }
    }

    async fn apply(&mut self, actions: Vec<Action>) -> Result<(), SessionError> {
        for action in actions {
            match action {
                Action::Send(packet) => self.send(self.data.state, &packet).await?,
                Action::EnableCompression(settings) => self.conn.enable_compression(settings),
                Action::EnableEncryption(secret) => self.conn.enable_encryption(&secret),
                Action::Transition(next) => self.transition(next)?,
                Action::Disconnect(reason) => {
                    info!("Disconnecting {}: {}", self.data.display_name(), reason.to_plain());
                    if let Some(state) = self.disconnect_state() {
                        self.send_disconnect(state, reason).await?;
                    }
                    self.data.state = ConnectionState::Closed;
                    break;
                }
                Action::Close => {
                    self.data.state = ConnectionState::Closed;
                    break;
                }
            }
        }
        self.flush().await
    }

    fn transition(&mut self, next: ConnectionState) -> Result<(), SessionError> {
        let from = self.data.state;
        self.data.state = from.transition(next)?;
        debug!("{}: {} -> {}", self.data.display_name(), from, next);

        let features = self.ctx.protocol.features(self.data.version);
        let heartbeat = match next {
            ConnectionState::Play => true,
            ConnectionState::Configuration => features.configuration_state,
            _ => false,
        };
        if !heartbeat {
            self.keep_alive = None;
        } else if self.keep_alive.is_none() {
            let settings = &self.ctx.settings;
            self.keep_alive = Some(KeepAlive::new(
                settings.keep_alive_interval,
                settings.keep_alive_timeout,
            ));
        }

        if next == ConnectionState::Play && !self.joined {
            self.joined = true;
            info!(
                "{} joined the game from {} using {} ({} online)",
                self.data.display_name(),
                self.data.address,
                self.data.version,
                self.ctx.online()
            );
        }
        Ok(())
    }

    /// The state whose Disconnect packet the client will understand right
    /// now, if there is one. A handshake announcing a login is answered in
    /// Login.
    fn disconnect_state(&self) -> Option<ConnectionState> {
        match self.data.state {
            state @ (ConnectionState::Login
            | ConnectionState::Configuration
            | ConnectionState::Play) => Some(state),
            ConnectionState::Handshake if self.data.intent == Some(ConnectionState::Login) => {
                Some(ConnectionState::Login)
            }
            _ => None,
        }
    }

    async fn send_disconnect(
        &mut self,
        state: ConnectionState,
        reason: TextComponent,
    ) -> Result<(), SessionError> {
        self.send(state, &InternalPacket::Disconnect { reason }).await?;
        self.flush().await
    }

    async fn send(
        &mut self,
        state: ConnectionState,
        packet: &InternalPacket,
    ) -> Result<(), SessionError> {
        let frames = self.ctx.protocol.encode(self.data.version, state, packet)?;
        for frame in frames {
            let limit = self.ctx.settings.write_timeout;
            bounded(limit, self.conn.write_frame(&frame)).await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SessionError> {
        let limit = self.ctx.settings.write_timeout;
        bounded(limit, self.conn.flush()).await
    }
}

async fn bounded(
    limit: std::time::Duration,
    write: impl Future<Output = Result<(), ConnectionError>>,
) -> Result<(), SessionError> {
    match timeout(limit, write).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(TimeoutError::Write(limit).into()),
    }
}
