//! Socket server: one reader and one writer task per connection

use promemoria_api::{
    ClientInfo, ClientRole, ErrorCode, ErrorInfo, Event, Request, Response, ResponsePayload,
    ResponseResult,
};
use promemoria_util::ClientId;
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::{encode_frame, read_frame, IpcError, IpcResult};

/// Socket file mode: owner and group may connect
const SOCKET_MODE: u32 = 0o660;

/// Events buffered per subscriber before it starts lagging
const EVENT_BUFFER: usize = 100;

/// What the server hands to the service loop
pub enum ServerMessage {
    /// A request that passed the role check
    Request {
        client_id: ClientId,
        request: Request,
    },
    ClientConnected {
        client_id: ClientId,
        info: ClientInfo,
    },
    ClientDisconnected {
        client_id: ClientId,
    },
}

/// A frame queued for one connection
struct Outgoing {
    frame: String,
    /// Answers `SubscribeEvents`: events may follow once this is written
    subscribes: bool,
}

impl Outgoing {
    fn encode(response: &Response) -> IpcResult<Self> {
        Ok(Self {
            frame: encode_frame(response)?,
            subscribes: matches!(
                response.result,
                ResponseResult::Ok(ResponsePayload::Subscribed { .. })
            ),
        })
    }
}

type Outbox = mpsc::UnboundedSender<Outgoing>;
type Connections = Arc<RwLock<HashMap<ClientId, Outbox>>>;

pub struct IpcServer {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    connections: Connections,
    events: broadcast::Sender<Event>,
    messages: mpsc::UnboundedSender<ServerMessage>,
    message_rx: Mutex<Option<mpsc::UnboundedReceiver<ServerMessage>>>,
}

impl IpcServer {
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (messages, message_rx) = mpsc::unbounded_channel();

        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            listener: None,
            connections: Arc::new(RwLock::new(HashMap::new())),
            events,
            messages,
            message_rx: Mutex::new(Some(message_rx)),
        }
    }

    /// Bind the socket, replacing a stale one left by a previous run
    pub async fn start(&mut self) -> IpcResult<()> {
        self.listener = Some(bind_socket(&self.socket_path)?);
        info!(path = %self.socket_path.display(), "IPC server listening");
        Ok(())
    }

    /// The receiving end for the service loop. Only the first call gets it.
    pub async fn take_message_receiver(&self) -> Option<mpsc::UnboundedReceiver<ServerMessage>> {
        self.message_rx.lock().await.take()
    }

    /// Accept connections until the task is dropped
    pub async fn run(&self) -> IpcResult<()> {
        let listener = self.listener.as_ref().ok_or(IpcError::NotStarted)?;

        loop {
            match listener.accept().await {
                Ok((stream, _)) => self.accept(stream).await,
                Err(e) => error!(error = %e, "Failed to accept connection"),
            }
        }
    }

    async fn accept(&self, stream: UnixStream) {
        let uid = peer_uid(&stream);
        let role = role_for_uid(uid, nix::unistd::getuid().as_raw());
        let mut info = ClientInfo::new(role);
        info.uid = uid;
        let client_id = info.client_id.clone();

        debug!(client_id = %client_id, uid = ?uid, role = ?role, "Connection accepted");

        let (read_half, write_half) = stream.into_split();
        let (outbox, outbox_rx) = mpsc::unbounded_channel();

        self.connections
            .write()
            .await
            .insert(client_id.clone(), outbox.clone());
        let _ = self.messages.send(ServerMessage::ClientConnected {
            client_id: client_id.clone(),
            info,
        });

        tokio::spawn(read_requests(
            read_half,
            client_id.clone(),
            role,
            outbox,
            self.messages.clone(),
            self.connections.clone(),
        ));
        tokio::spawn(write_frames(
            write_half,
            client_id,
            outbox_rx,
            self.events.subscribe(),
            self.messages.clone(),
        ));
    }

    /// Queue a response for one connection
    pub async fn send_response(&self, client_id: &ClientId, response: Response) -> IpcResult<()> {
        let outgoing = Outgoing::encode(&response)?;
        let connections = self.connections.read().await;
        let outbox = connections.get(client_id).ok_or(IpcError::ConnectionClosed)?;
        outbox.send(outgoing).map_err(|_| IpcError::ConnectionClosed)
    }

    /// Publish to every subscribed connection
    pub fn broadcast_event(&self, event: Event) {
        let _ = self.events.send(event);
    }

    /// Remove the socket file
    pub fn shutdown(&self) {
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn bind_socket(path: &Path) -> IpcResult<UnixListener> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let listener = UnixListener::bind(path)?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(SOCKET_MODE))?;
    Ok(listener)
}

/// Parse requests until EOF. Observers are answered here when they try to
/// change alert state.
async fn read_requests(
    read_half: OwnedReadHalf,
    client_id: ClientId,
    role: ClientRole,
    outbox: Outbox,
    messages: mpsc::UnboundedSender<ServerMessage>,
    connections: Connections,
) {
    let mut reader = BufReader::new(read_half);
    let mut buf = String::new();

    loop {
        let request = match read_frame::<Request, _>(&mut reader, &mut buf).await {
            Ok(request) => request,
            Err(IpcError::Json(e)) => {
                warn!(client_id = %client_id, error = %e, "Invalid request");
                let response =
                    Response::error(0, ErrorInfo::new(ErrorCode::InvalidRequest, e.to_string()));
                if let Ok(outgoing) = Outgoing::encode(&response) {
                    let _ = outbox.send(outgoing);
                }
                continue;
            }
            Err(e) => {
                debug!(client_id = %client_id, error = %e, "Connection closed");
                break;
            }
        };

        if let Some(denied) = gate(role, &request) {
            warn!(client_id = %client_id, command = ?request.command, "Command denied");
            if let Ok(outgoing) = Outgoing::encode(&denied) {
                let _ = outbox.send(outgoing);
            }
            continue;
        }

        let _ = messages.send(ServerMessage::Request {
            client_id: client_id.clone(),
            request,
        });
    }

    // Last sender goes away with the entry, which ends the writer
    connections.write().await.remove(&client_id);
}

/// Write queued responses and, once the `Subscribed` response is out, the
/// event stream. Events that arrive before that are dropped, so a client
/// always sees its subscribe response first.
async fn write_frames(
    mut writer: OwnedWriteHalf,
    client_id: ClientId,
    mut outbox: mpsc::UnboundedReceiver<Outgoing>,
    mut events: broadcast::Receiver<Event>,
    messages: mpsc::UnboundedSender<ServerMessage>,
) {
    let mut subscribed = false;

    loop {
        let (frame, subscribes) = tokio::select! {
            response = outbox.recv() => match response {
                Some(outgoing) => (outgoing.frame, outgoing.subscribes),
                None => break,
            },
            event = events.recv() => match event {
                Ok(_) if !subscribed => continue,
                Ok(event) => match encode_frame(&event) {
                    Ok(frame) => (frame, false),
                    Err(e) => {
                        warn!(error = %e, "Failed to encode event");
                        continue;
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(client_id = %client_id, skipped, "Subscriber lagging");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        };

        if let Err(e) = writer.write_all(frame.as_bytes()).await {
            debug!(client_id = %client_id, error = %e, "Write failed");
            break;
        }
        subscribed |= subscribes;
    }

    let _ = messages.send(ServerMessage::ClientDisconnected { client_id });
}

/// The response for a request the role may not make, if any
pub fn gate(role: ClientRole, request: &Request) -> Option<Response> {
    if request.command.is_mutating() && !role.can_schedule() {
        Some(Response::error(
            request.request_id,
            ErrorInfo::new(ErrorCode::PermissionDenied, "Owner role required"),
        ))
    } else {
        None
    }
}

/// Same user or root may drive alerts; anyone else only observes
pub fn role_for_uid(uid: Option<u32>, own_uid: u32) -> ClientRole {
    match uid {
        Some(0) => ClientRole::Owner,
        Some(u) if u == own_uid => ClientRole::Owner,
        _ => ClientRole::Observer,
    }
}

fn peer_uid(stream: &UnixStream) -> Option<u32> {
    use nix::sys::socket::{getsockopt, sockopt::PeerCredentials};
    use std::os::unix::io::AsFd;

    getsockopt(&stream.as_fd(), PeerCredentials)
        .ok()
        .map(|cred| cred.uid())
}
