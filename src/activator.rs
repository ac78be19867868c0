use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;
use crate::dataverse::{Connector, DataService};
use crate::error::{ActivatorError, ConfigError};
use crate::parameters::{ConnectionParameters, SolutionTarget, StepState};
use crate::solution::{self, PluginStep, SolutionComponent, SDK_MESSAGE_PROCESSING_STEP};

/// Process outcome of one activation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => -1,
        }
    }
}

/// What a run did. Skipped steps are the ones whose object id was not a GUID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub components: usize,
    pub plugin_steps: usize,
    pub updated: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: bool,
}

impl RunSummary {
    fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }
}

/// Enables or disables every plugin step in one solution.
pub struct Activator {
    connection: ConnectionParameters,
    solution: SolutionTarget,
}

impl Activator {
    pub fn new(connection: ConnectionParameters, solution: SolutionTarget) -> Self {
        Self { connection, solution }
    }

    /// Runs once and maps the result to an exit status. Cancellation is a clean stop;
    /// any other error is logged as critical.
    pub async fn execute(&self, connector: &dyn Connector, cancel: &CancellationToken) -> ExitStatus {
        info!("Running PluginActivator...");

        match self.run(connector, cancel).await {
            Ok(summary) if summary.cancelled => {
                debug!(?summary, "PluginActivator cancelled");
                ExitStatus::Success
            }
            Ok(summary) => {
                info!(
                    components = summary.components,
                    plugin_steps = summary.plugin_steps,
                    updated = summary.updated,
                    failed = summary.failed,
                    skipped = summary.skipped,
                    "PluginActivator finished..."
                );
                ExitStatus::Success
            }
            Err(e) => {
                error!(critical = true, error = %e, "Critical error in application.");
                ExitStatus::Failure
            }
        }
    }

    /// Connects, toggles the solution's plugin steps and closes the session,
    /// whether or not the toggling succeeded.
    pub async fn run(&self, connector: &dyn Connector, cancel: &CancellationToken) -> Result<RunSummary, ActivatorError> {
        if self.solution.unique_name.trim().is_empty() {
            return Err(ConfigError::Missing("SOLUTION_UNIQUE_NAME").into());
        }

        info!("Connecting to Dynamics 365");
        let connection_string = self.connection.client_secret_connection_string();
        let session = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(RunSummary::cancelled()),
            session = connector.connect(&connection_string) => session?,
        };
        info!("Successfully connected");

        let result = self.toggle_plugin_steps(session.as_ref(), cancel).await;
        session.close().await;
        result
    }

    async fn toggle_plugin_steps(&self, session: &dyn DataService, cancel: &CancellationToken) -> Result<RunSummary, ActivatorError> {
        let name = &self.solution.unique_name;
        info!("Retrieving solution components in solution {}...", name);

        let query = solution::components_in_solution_query(name);
        let collection = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(RunSummary::cancelled()),
            collection = session.retrieve_multiple(&query) => collection?,
        };
        info!("Solution components retrieved.");

        let components: Vec<SolutionComponent> = collection.entities.iter().map(SolutionComponent::from_entity).collect();
        let mut summary = RunSummary {
            components: components.len(),
            ..RunSummary::default()
        };

        let state = self.solution.desired_state();
        for component in solution::plugin_steps_in_solution(&components) {
            // An update already sent is never abandoned; stop before the next one.
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            summary.plugin_steps += 1;

            let Some(step) = PluginStep::from_component(component) else {
                summary.skipped += 1;
                continue;
            };

            if change_plugin_step_state(session, step.id, state).await {
                summary.updated += 1;
            } else {
                summary.failed += 1;
            }
        }

        Ok(summary)
    }
}

async fn change_plugin_step_state(session: &dyn DataService, plugin_step_id: Uuid, state: StepState) -> bool {
    info!("Updating plugin step with Id {} to be {}...", plugin_step_id, state);

    let updated = session
        .update_state_and_status_for_entity(SDK_MESSAGE_PROCESSING_STEP, plugin_step_id, state.state_code(), state.status_code())
        .await;

    if updated {
        info!("Successfully updated plugin step with Id {} to be {}", plugin_step_id, state);
    } else {
        error!("Error updating plugin step with Id {} to be {}", plugin_step_id, state);
    }
    updated
}
