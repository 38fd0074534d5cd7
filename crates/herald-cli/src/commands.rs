//! Command handlers for CLI subcommands.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use herald_auth::{AuthError, LoginStatus, StatusConfig, StatusStore};
use herald_events::Callback;
use herald_models::{LoginEvent, LoginFailure, LoginPayload, LoginResult, LoginState};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::cli::{Commands, OutputFormat};
use crate::step::Step;

/// Errors raised while running a command.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Login status operation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Output could not be serialized.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Output could not be written.
    #[error("write error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Subscriber name of the listener attached before the first step.
const OBSERVER: &str = "observer";

/// One event seen by a subscriber during a simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// 1-based index of the step that caused the event.
    pub step: usize,
    /// Which subscriber saw it.
    pub subscriber: String,
    /// The event name.
    pub event: LoginEvent,
    /// The delivered payload.
    pub payload: LoginPayload,
    /// Store state when the listener ran.
    pub state: LoginState,
}

/// Final state of a simulation.
#[derive(Debug, Serialize)]
struct Summary {
    final_state: LoginState,
    results: Vec<LoginResult>,
}

/// Execute a CLI command, writing its output to `out`.
pub fn execute(command: Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Simulate {
            steps,
            format,
            history_limit,
        } => cmd_simulate(&steps, format, history_limit, out),
        Commands::States => cmd_states(out),
    }
}

/// Runs `steps` against a fresh store and returns what subscribers saw.
pub fn simulate(steps: &[Step], history_limit: usize) -> Result<(Vec<Observation>, StatusStore)> {
    let store = StatusStore::new(StatusConfig::new().with_history_limit(history_limit));
    let observer = LoginStatus::with_store(&store);
    let late = LoginStatus::with_store(&store);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let current = Arc::new(AtomicUsize::new(0));

    let record = |subscriber: String| {
        let seen = seen.clone();
        let current = current.clone();
        let store = store.clone();
        Callback::new(move |payload: &LoginPayload| {
            let observation = Observation {
                step: current.load(Ordering::SeqCst),
                subscriber: subscriber.clone(),
                event: payload.event(),
                payload: payload.clone(),
                state: store.status(),
            };
            if let Ok(mut seen) = seen.lock() {
                seen.push(observation);
            }
        })
    };

    for event in LoginEvent::ALL {
        observer.on(event, record(OBSERVER.to_string()), None)?;
    }

    for (index, step) in steps.iter().enumerate() {
        let number = index + 1;
        current.store(number, Ordering::SeqCst);
        debug!(step = number, ?step, "running step");

        match step {
            Step::Logging => observer.logging()?,
            Step::Success(payload) => observer.success(payload.clone())?,
            Step::Fail(message) => observer.fail(LoginFailure::new(message.clone()))?,
            Step::Subscribe(event) => {
                late.on(*event, record(format!("late#{}", number)), None)?;
            }
        }
    }

    info!(steps = steps.len(), state = %store.status(), "simulation finished");

    // Recorders hold a store handle; detach them so the store can be freed.
    observer.clear()?;
    late.clear()?;

    let observations = seen.lock().map(|seen| seen.clone()).unwrap_or_default();
    Ok((observations, store))
}

fn cmd_simulate(
    steps: &[Step],
    format: OutputFormat,
    history_limit: usize,
    out: &mut impl Write,
) -> Result<()> {
    let (observations, store) = simulate(steps, history_limit)?;
    let summary = Summary {
        final_state: store.status(),
        results: store.results(),
    };

    match format {
        OutputFormat::Table => {
            writeln!(
                out,
                "{:<5} {:<10} {:<14} {:<12} PAYLOAD",
                "STEP", "SUBSCRIBER", "EVENT", "STATE"
            )?;
            for observation in &observations {
                writeln!(
                    out,
                    "{:<5} {:<10} {:<14} {:<12} {}",
                    observation.step,
                    observation.subscriber,
                    observation.event.as_str(),
                    observation.state.as_str(),
                    describe(&observation.payload)
                )?;
            }
            writeln!(
                out,
                "final state: {} ({} results retained)",
                summary.final_state,
                summary.results.len()
            )?;
        }
        OutputFormat::Json => {
            for observation in &observations {
                writeln!(out, "{}", serde_json::to_string(observation)?)?;
            }
            writeln!(out, "{}", serde_json::to_string(&summary)?)?;
        }
    }

    Ok(())
}

fn cmd_states(out: &mut impl Write) -> Result<()> {
    let transitions = [
        (LoginState::Pending, "logging()", LoginState::InProgress),
        (LoginState::InProgress, "success(v)", LoginState::Succeeded),
        (LoginState::InProgress, "fail(e)", LoginState::Pending),
        (LoginState::Succeeded, "logging()", LoginState::InProgress),
        (LoginState::Succeeded, "fail(e)", LoginState::Pending),
    ];

    writeln!(out, "{:<12} {:<12} TO", "FROM", "CALL")?;
    for (from, call, to) in transitions {
        writeln!(out, "{:<12} {:<12} {}", from.as_str(), call, to.as_str())?;
    }
    Ok(())
}

/// Renders a payload for the table view.
fn describe(payload: &LoginPayload) -> String {
    match payload {
        LoginPayload::Logging => "-".to_string(),
        LoginPayload::Success(value) => value.to_string(),
        LoginPayload::Fail(failure) => failure.to_string(),
        LoginPayload::StatusChange(state) => state.to_string(),
    }
}
