//! Mock host adapter for testing

use chrono::{DateTime, Local};
use promemoria_api::{ActionRequest, Ringtone, WakePrecision};
use promemoria_util::{AlertHandle, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::{
    HostAdapter, HostCapabilities, HostError, HostEvent, HostResult, SurfaceSpec, WakeToken,
};

/// A wake currently armed on the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedWake {
    pub token: WakeToken,
    pub at: DateTime<Local>,
    pub precision: WakePrecision,
}

/// Every adapter call, in order
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ArmWake(WakeToken, WakePrecision),
    DisarmWake(AlertHandle),
    ArmAutoStop(SessionId, Duration),
    DisarmAutoStop(SessionId),
    PostSurface(AlertHandle),
    CancelSurface(AlertHandle),
    StartAudio(Ringtone),
    StopAudio,
    StartVibration,
    StopVibration,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    wakes: HashMap<AlertHandle, ArmedWake>,
    surfaces: HashMap<AlertHandle, SurfaceSpec>,
    posted: Vec<SurfaceSpec>,
    auto_stops: HashMap<SessionId, Duration>,
    audio: Option<Ringtone>,
    vibration: Option<Vec<Duration>>,
}

/// Mock host adapter for unit/integration testing.
///
/// Records every call and the resulting platform state. Nothing fires on
/// its own; tests drive wakes and timeouts explicitly.
pub struct MockHost {
    capabilities: HostCapabilities,
    state: Mutex<MockState>,
    event_tx: mpsc::UnboundedSender<HostEvent>,
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<HostEvent>>>,

    /// Refuse exact wakes with `ExactWakeDenied`
    pub deny_exact: Arc<Mutex<bool>>,

    /// Make `start_audio` fail
    pub fail_audio: Arc<Mutex<bool>>,

    /// Make `post_surface` fail (no notification service)
    pub fail_surface: Arc<Mutex<bool>>,

    /// Refuse every wake, exact or not
    pub fail_wakes: Arc<Mutex<bool>>,
}

fn flag(flag: &Mutex<bool>) -> bool {
    *flag.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockHost {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            capabilities: HostCapabilities::full(),
            state: Mutex::new(MockState::default()),
            event_tx: tx,
            event_rx: Mutex::new(Some(rx)),
            deny_exact: Arc::new(Mutex::new(false)),
            fail_audio: Arc::new(Mutex::new(false)),
            fail_surface: Arc::new(Mutex::new(false)),
            fail_wakes: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_capabilities(mut self, caps: HostCapabilities) -> Self {
        self.capabilities = caps;
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_deny_exact(&self, deny: bool) {
        *self.deny_exact.lock().unwrap_or_else(|e| e.into_inner()) = deny;
    }

    pub fn set_fail_audio(&self, fail: bool) {
        *self.fail_audio.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    pub fn set_fail_surface(&self, fail: bool) {
        *self.fail_surface.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    pub fn set_fail_wakes(&self, fail: bool) {
        *self.fail_wakes.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    /// All calls so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// The wake currently armed for a handle
    pub fn armed_wake(&self, handle: AlertHandle) -> Option<ArmedWake> {
        self.state().wakes.get(&handle).cloned()
    }

    pub fn armed_wakes(&self) -> Vec<ArmedWake> {
        self.state().wakes.values().cloned().collect()
    }

    /// The surface currently visible for a handle
    pub fn surface(&self, handle: AlertHandle) -> Option<SurfaceSpec> {
        self.state().surfaces.get(&handle).cloned()
    }

    pub fn visible_surfaces(&self) -> usize {
        self.state().surfaces.len()
    }

    /// Every surface ever posted, in order
    pub fn posted_surfaces(&self) -> Vec<SurfaceSpec> {
        self.state().posted.clone()
    }

    pub fn audio_playing(&self) -> Option<Ringtone> {
        self.state().audio
    }

    pub fn vibrating(&self) -> bool {
        self.state().vibration.is_some()
    }

    pub fn auto_stop_armed(&self, session_id: &SessionId) -> Option<Duration> {
        self.state().auto_stops.get(session_id).copied()
    }

    /// Consume the armed wake for a handle the way a real timer would, and
    /// emit `WakeFired`. Returns the token that fired.
    pub fn fire_wake(&self, handle: AlertHandle) -> Option<WakeToken> {
        let wake = self.state().wakes.remove(&handle)?;
        let _ = self.event_tx.send(HostEvent::WakeFired(wake.token));
        Some(wake.token)
    }

    /// Emit `AutoStopElapsed` for an armed session timer
    pub fn elapse_auto_stop(&self, session_id: &SessionId) -> bool {
        let armed = self.state().auto_stops.remove(session_id).is_some();
        if armed {
            let _ = self
                .event_tx
                .send(HostEvent::AutoStopElapsed(session_id.clone()));
        }
        armed
    }

    /// Simulate a button press on a surface
    pub fn press(&self, request: ActionRequest) {
        let _ = self.event_tx.send(HostEvent::ActionInvoked(request));
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostAdapter for MockHost {
    fn capabilities(&self) -> &HostCapabilities {
        &self.capabilities
    }

    fn arm_wake(
        &self,
        token: WakeToken,
        at: DateTime<Local>,
        precision: WakePrecision,
    ) -> HostResult<()> {
        if flag(&self.fail_wakes) {
            return Err(HostError::Unavailable("no wake timers".into()));
        }
        if precision == WakePrecision::Exact && flag(&self.deny_exact) {
            return Err(HostError::ExactWakeDenied("mock denial".into()));
        }

        let mut state = self.state();
        state.calls.push(MockCall::ArmWake(token, precision));
        state.wakes.insert(
            token.handle,
            ArmedWake {
                token,
                at,
                precision,
            },
        );
        Ok(())
    }

    fn disarm_wake(&self, handle: AlertHandle) -> HostResult<()> {
        let mut state = self.state();
        state.calls.push(MockCall::DisarmWake(handle));
        state.wakes.remove(&handle);
        Ok(())
    }

    fn arm_auto_stop(&self, session_id: &SessionId, after: Duration) -> HostResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(MockCall::ArmAutoStop(session_id.clone(), after));
        state.auto_stops.insert(session_id.clone(), after);
        Ok(())
    }

    fn disarm_auto_stop(&self, session_id: &SessionId) -> HostResult<()> {
        let mut state = self.state();
        state.calls.push(MockCall::DisarmAutoStop(session_id.clone()));
        state.auto_stops.remove(session_id);
        Ok(())
    }

    fn post_surface(&self, spec: &SurfaceSpec) -> HostResult<()> {
        if flag(&self.fail_surface) {
            return Err(HostError::Unavailable("no notification service".into()));
        }

        let mut state = self.state();
        state.calls.push(MockCall::PostSurface(spec.handle));
        state.surfaces.insert(spec.handle, spec.clone());
        state.posted.push(spec.clone());
        Ok(())
    }

    fn cancel_surface(&self, handle: AlertHandle) -> HostResult<()> {
        let mut state = self.state();
        state.calls.push(MockCall::CancelSurface(handle));
        state.surfaces.remove(&handle);
        Ok(())
    }

    fn start_audio(&self, ringtone: Ringtone) -> HostResult<()> {
        if flag(&self.fail_audio) {
            return Err(HostError::Driver("mock audio failure".into()));
        }

        let mut state = self.state();
        state.calls.push(MockCall::StartAudio(ringtone));
        state.audio = Some(ringtone);
        Ok(())
    }

    fn stop_audio(&self) -> HostResult<()> {
        let mut state = self.state();
        state.calls.push(MockCall::StopAudio);
        state.audio = None;
        Ok(())
    }

    fn start_vibration(&self, pattern: &[Duration]) -> HostResult<()> {
        if !self.capabilities.vibration {
            return Err(HostError::Unavailable("no vibration motor".into()));
        }

        let mut state = self.state();
        state.calls.push(MockCall::StartVibration);
        state.vibration = Some(pattern.to_vec());
        Ok(())
    }

    fn stop_vibration(&self) -> HostResult<()> {
        let mut state = self.state();
        state.calls.push(MockCall::StopVibration);
        state.vibration = None;
        Ok(())
    }

    fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<HostEvent>> {
        self.event_rx.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}
