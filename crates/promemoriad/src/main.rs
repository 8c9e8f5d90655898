//! promemoriad - The promemoria alert service
//!
//! This is the main entry point for the promemoriad service.
//! It wires together all the components:
//! - Configuration loading
//! - Store initialization
//! - Alert engine
//! - Host adapter (Linux)
//! - IPC server

use anyhow::{Context, Result};
use clap::Parser;
use promemoria_api::{
    Command, ErrorCode, ErrorInfo, Event, EventPayload, Response, ResponsePayload,
};
use promemoria_config::{load_config_or_default, ServiceConfig};
use promemoria_core::{AlertEngine, EngineOptions, Trigger};
use promemoria_host_api::{HostAdapter, HostEvent};
use promemoria_host_linux::{LinuxHost, LinuxHostOptions};
use promemoria_ipc::{IpcServer, ServerMessage};
use promemoria_store::{AuditEvent, AuditEventType, SqliteStore, Store};
use promemoria_util::{
    default_config_path, AlertError, ClientId, MonotonicInstant, STORE_FILENAME,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// promemoriad - Alert scheduling and alarm service for reminders
#[derive(Parser, Debug)]
#[command(name = "promemoriad")]
#[command(about = "Alert scheduling and alarm service for reminders", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/promemoria/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Socket path override (or set PROMEMORIA_SOCKET env var)
    #[arg(short, long, env = "PROMEMORIA_SOCKET")]
    socket: Option<PathBuf>,

    /// Data directory override (or set PROMEMORIA_DATA_DIR env var)
    #[arg(short, long, env = "PROMEMORIA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Reminder store override (default: <data-dir>/store.db)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// How often the engine checks for alarms that outlived their deadline
const TICK_INTERVAL: Duration = Duration::from_secs(1);

type SharedEngine = Arc<Mutex<AlertEngine>>;

/// Main service state
struct Service {
    engine: AlertEngine,
    host: Arc<LinuxHost>,
    ipc: Arc<IpcServer>,
    store: Arc<dyn Store>,
}

impl Service {
    async fn new(args: &Args) -> Result<Self> {
        let config = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(config_path = %args.config.display(), "Configuration loaded");

        let socket_path = args
            .socket
            .clone()
            .unwrap_or_else(|| config.service.socket_path.clone());

        let store_path = match (&args.store, &args.data_dir) {
            (Some(store), _) => store.clone(),
            (None, Some(data_dir)) => data_dir.join(STORE_FILENAME),
            (None, None) => config.service.store_path.clone(),
        };

        let store: Arc<dyn Store> = Arc::new(
            SqliteStore::open(&store_path)
                .with_context(|| format!("Failed to open store {:?}", store_path))?,
        );

        info!(store_path = %store_path.display(), "Store initialized");

        store.append_audit(AuditEvent::new(AuditEventType::ServiceStarted))?;

        let host = Arc::new(
            LinuxHost::new(host_options(&config)).context("Failed to initialize host adapter")?,
        );

        let mut engine = AlertEngine::new(
            EngineOptions::from_config(&config),
            store.clone(),
            host.clone(),
        );
        engine.restore();

        let mut ipc = IpcServer::new(&socket_path);
        ipc.start().await?;

        info!(socket_path = %socket_path.display(), "IPC server started");

        Ok(Self {
            engine,
            host,
            ipc: Arc::new(ipc),
            store,
        })
    }

    async fn run(self) -> Result<()> {
        let mut host_events = self
            .host
            .subscribe()
            .context("Host event receiver already taken")?;
        let ipc_ref = self.ipc.clone();
        let mut ipc_messages = ipc_ref
            .take_message_receiver()
            .await
            .context("IPC message receiver already taken")?;

        let engine: SharedEngine = Arc::new(Mutex::new(self.engine));
        let host = self.host.clone();
        let store = self.store.clone();

        // Events from restoring saved wakes
        Self::publish(&engine, &ipc_ref).await;

        let ipc_accept = ipc_ref.clone();
        tokio::spawn(async move {
            if let Err(e) = ipc_accept.run().await {
                error!(error = %e, "IPC server error");
            }
        });

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup =
            signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        let mut tick_timer = tokio::time::interval(TICK_INTERVAL);

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, shutting down gracefully");
                    break;
                }

                // Backstop for auto-stop timers
                _ = tick_timer.tick() => {
                    engine.lock().await.tick(MonotonicInstant::now());
                    Self::publish(&engine, &ipc_ref).await;
                }

                Some(host_event) = host_events.recv() => {
                    Self::handle_host_event(&engine, &ipc_ref, host_event).await;
                }

                Some(msg) = ipc_messages.recv() => {
                    Self::handle_ipc_message(&engine, &ipc_ref, msg).await;
                }
            }
        }

        info!("Shutting down promemoriad");

        engine.lock().await.handle(
            Trigger::Teardown,
            promemoria_util::now(),
            MonotonicInstant::now(),
        );
        Self::publish(&engine, &ipc_ref).await;
        ipc_ref.broadcast_event(Event::new(EventPayload::Shutdown));

        host.shutdown();

        if let Err(e) = store.append_audit(AuditEvent::new(AuditEventType::ServiceStopped)) {
            warn!(error = %e, "Failed to log service shutdown");
        }

        ipc_ref.shutdown();
        info!("Shutdown complete");
        Ok(())
    }

    /// Broadcast everything the engine emitted, then the new state
    async fn publish(engine: &SharedEngine, ipc: &Arc<IpcServer>) {
        let (events, state) = {
            let mut engine = engine.lock().await;
            (engine.drain_events(), engine.snapshot(MonotonicInstant::now()))
        };
        if events.is_empty() {
            return;
        }

        for event in events {
            ipc.broadcast_event(Event::new(event.into_payload()));
        }
        ipc.broadcast_event(Event::new(EventPayload::StateChanged(state)));
    }

    async fn handle_host_event(engine: &SharedEngine, ipc: &Arc<IpcServer>, event: HostEvent) {
        debug!(event = ?event, "Host event");
        engine.lock().await.handle(
            Trigger::from(event),
            promemoria_util::now(),
            MonotonicInstant::now(),
        );
        Self::publish(engine, ipc).await;
    }

    async fn handle_ipc_message(engine: &SharedEngine, ipc: &Arc<IpcServer>, msg: ServerMessage) {
        match msg {
            // Role checks already happened in the connection reader
            ServerMessage::Request { client_id, request } => {
                let response =
                    Self::handle_command(engine, &client_id, request.request_id, request.command)
                        .await;

                if let Err(e) = ipc.send_response(&client_id, response).await {
                    debug!(client_id = %client_id, error = %e, "Response not delivered");
                }
                Self::publish(engine, ipc).await;
            }

            ServerMessage::ClientConnected { client_id, info } => {
                info!(
                    client_id = %client_id,
                    role = ?info.role,
                    uid = ?info.uid,
                    "Client connected"
                );
            }

            ServerMessage::ClientDisconnected { client_id } => {
                debug!(client_id = %client_id, "Client disconnected");
            }
        }
    }

    async fn handle_command(
        engine: &SharedEngine,
        client_id: &ClientId,
        request_id: u64,
        command: Command,
    ) -> Response {
        let now = promemoria_util::now();
        let now_mono = MonotonicInstant::now();

        match command {
            Command::ScheduleAlert {
                id,
                title,
                body,
                timestamp,
            } => {
                let result = engine
                    .lock()
                    .await
                    .schedule_alert(&id, title.as_deref(), &body, timestamp);
                match result {
                    Ok(handle) => {
                        Response::success(request_id, ResponsePayload::Scheduled { handle })
                    }
                    Err(e) => Response::error(request_id, error_info(&e)),
                }
            }

            Command::CancelAlert { id } => match engine.lock().await.cancel_alert(&id, now_mono) {
                Ok(()) => Response::success(request_id, ResponsePayload::Cancelled),
                Err(e) => Response::error(request_id, error_info(&e)),
            },

            Command::TestFire => {
                let handle = engine.lock().await.test_fire(now);
                Response::success(request_id, ResponsePayload::TestFired { handle })
            }

            Command::Action(action) => {
                engine
                    .lock()
                    .await
                    .handle(Trigger::Action(action), now, now_mono);
                Response::success(request_id, ResponsePayload::ActionAccepted)
            }

            Command::GetState => {
                let state = engine.lock().await.snapshot(now_mono);
                Response::success(request_id, ResponsePayload::State(state))
            }

            Command::GetHealth => {
                let health = engine.lock().await.health();
                Response::success(request_id, ResponsePayload::Health(health))
            }

            Command::SubscribeEvents => Response::success(
                request_id,
                ResponsePayload::Subscribed {
                    client_id: client_id.clone(),
                },
            ),

            Command::Ping => Response::success(request_id, ResponsePayload::Pong),
        }
    }
}

fn host_options(config: &ServiceConfig) -> LinuxHostOptions {
    LinuxHostOptions {
        allow_exact: config.scheduling.allow_exact,
        inexact_window: config.scheduling.inexact_window,
        notifications_enabled: config.notifications.enabled,
        app_name: config.notifications.app_name.clone(),
        sounds_dir: config.output.sounds_dir.clone(),
        player: config.output.player.clone(),
    }
}

/// Contract errors keep their own codes; anything else is internal
fn error_info(error: &AlertError) -> ErrorInfo {
    if !error.is_contract_error() {
        error!(error = %error, "Command failed");
        return ErrorInfo::new(ErrorCode::InternalError, error.to_string());
    }

    let code = match error {
        AlertError::MissingField(_) => ErrorCode::MissingField,
        _ => ErrorCode::SchedulerUnavailable,
    };
    ErrorInfo::new(code, error.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mock_time = promemoria_util::is_mock_time_active(),
        "promemoriad starting"
    );

    let service = Service::new(&args).await?;
    service.run().await
}
