use std::sync::Arc;

use crate::admin::AdminConsole;
use crate::models::Session;
use crate::services::{UserAdministration, WorkflowServices};
use crate::workflow::WorkflowController;

/// Shared context bundling the signed-in session with the backend
/// collaborators, used by the CLI and by tests to build controllers.
#[derive(Clone)]
pub struct AppContext {
    session: Session,
    services: WorkflowServices,
    admin: Arc<dyn UserAdministration>,
}

impl AppContext {
    pub fn new(
        session: Session,
        services: WorkflowServices,
        admin: Arc<dyn UserAdministration>,
    ) -> Self {
        Self {
            session,
            services,
            admin,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn services(&self) -> &WorkflowServices {
        &self.services
    }

    /// A fresh controller for this session, starting Idle.
    pub fn workflow_controller(&self) -> WorkflowController {
        WorkflowController::new(self.session.clone(), self.services.clone())
    }

    pub fn admin_console(&self) -> AdminConsole {
        AdminConsole::new(self.admin.clone())
    }
}
