//! Client side of the socket, as used by the reminder application

use promemoria_api::{
    ActionRequest, Command, Event, HealthStatus, Request, Response, ResponsePayload,
    ResponseResult, ServiceStateSnapshot,
};
use promemoria_util::AlertHandle;
use std::path::Path;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};

use crate::{encode_frame, read_frame, IpcError, IpcResult};

pub struct IpcClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    buf: String,
    next_request_id: u64,
}

impl IpcClient {
    pub async fn connect(socket_path: impl AsRef<Path>) -> IpcResult<Self> {
        let (read_half, write_half) = UnixStream::connect(socket_path).await?.into_split();

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            buf: String::new(),
            next_request_id: 1,
        })
    }

    /// Send a command and wait for the raw response
    pub async fn send(&mut self, command: Command) -> IpcResult<Response> {
        let request = Request::new(self.next_request_id, command);
        self.next_request_id += 1;

        self.writer
            .write_all(encode_frame(&request)?.as_bytes())
            .await?;
        read_frame(&mut self.reader, &mut self.buf).await
    }

    /// Send a command; an error result becomes `IpcError::Rejected`
    pub async fn request(&mut self, command: Command) -> IpcResult<ResponsePayload> {
        match self.send(command).await?.result {
            ResponseResult::Ok(payload) => Ok(payload),
            ResponseResult::Err(e) => Err(IpcError::Rejected {
                code: e.code,
                message: e.message,
            }),
        }
    }

    pub async fn schedule_alert(
        &mut self,
        id: &str,
        title: Option<&str>,
        body: &str,
        timestamp: i64,
    ) -> IpcResult<AlertHandle> {
        let command = Command::ScheduleAlert {
            id: id.to_string(),
            title: title.map(str::to_string),
            body: body.to_string(),
            timestamp,
        };
        match self.request(command).await? {
            ResponsePayload::Scheduled { handle } => Ok(handle),
            other => Err(unexpected(other)),
        }
    }

    pub async fn cancel_alert(&mut self, id: &str) -> IpcResult<()> {
        match self.request(Command::CancelAlert { id: id.to_string() }).await? {
            ResponsePayload::Cancelled => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub async fn test_fire(&mut self) -> IpcResult<AlertHandle> {
        match self.request(Command::TestFire).await? {
            ResponsePayload::TestFired { handle } => Ok(handle),
            other => Err(unexpected(other)),
        }
    }

    /// Forward a surface action the host application received itself
    pub async fn act(&mut self, action: ActionRequest) -> IpcResult<()> {
        match self.request(Command::Action(action)).await? {
            ResponsePayload::ActionAccepted => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub async fn state(&mut self) -> IpcResult<ServiceStateSnapshot> {
        match self.request(Command::GetState).await? {
            ResponsePayload::State(state) => Ok(state),
            other => Err(unexpected(other)),
        }
    }

    pub async fn health(&mut self) -> IpcResult<HealthStatus> {
        match self.request(Command::GetHealth).await? {
            ResponsePayload::Health(health) => Ok(health),
            other => Err(unexpected(other)),
        }
    }

    /// Turn this connection into an event stream
    pub async fn subscribe(mut self) -> IpcResult<EventStream> {
        match self.request(Command::SubscribeEvents).await? {
            ResponsePayload::Subscribed { .. } => Ok(EventStream {
                reader: self.reader,
                buf: self.buf,
                _writer: self.writer,
            }),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(payload: ResponsePayload) -> IpcError {
    IpcError::UnexpectedResponse(format!("{payload:?}"))
}

/// Events pushed by promemoriad after `subscribe`
pub struct EventStream {
    reader: BufReader<OwnedReadHalf>,
    buf: String,
    // Dropping the write half would shut the connection down
    _writer: OwnedWriteHalf,
}

impl EventStream {
    pub async fn next(&mut self) -> IpcResult<Event> {
        read_frame(&mut self.reader, &mut self.buf).await
    }
}
