//! Notification surface model

use promemoria_api::{ActionRequest, AlertAction, SurfaceStyle};
use promemoria_util::{AlertHandle, ReminderId};
use serde::{Deserialize, Serialize};

/// A button on a surface. Invoking it hands `request` back to the core
/// without foregrounding the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceAction {
    pub label: String,
    pub request: ActionRequest,
}

/// Everything a host needs to render an alert surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub handle: AlertHandle,
    pub reminder_id: ReminderId,
    /// Displayed title (decorated and personalised)
    pub title: String,
    pub body: String,
    pub style: SurfaceStyle,
    /// Cannot be swiped away; only an action or a cancel removes it
    pub persistent: bool,
    pub actions: Vec<SurfaceAction>,
    /// Tapping the body asks the host application to come forward
    pub open_on_tap: bool,
}

impl SurfaceSpec {
    /// The button carrying the given action, if any
    pub fn action(&self, action: AlertAction) -> Option<&SurfaceAction> {
        self.actions.iter().find(|a| a.request.action == action)
    }
}
