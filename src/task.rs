//! Background execution of a catchment run with cooperative cancellation.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use geo::Point;
use tracing::{error, info, warn};

use crate::error::{CatchmentError, Result};
use crate::geometry::{Reproject, SameCrs};
use crate::operations::{AggregateCatchment, PrepareObstacles, RelaxVisibility};
use crate::output::{CatchmentResult, LayerStyle, RunStats};
use crate::params::CatchmentParams;

#[derive(Debug, Default)]
struct CancelState {
    canceled: AtomicBool,
    checks_left: Option<AtomicUsize>,
}

/// Shared flag through which a caller asks a run to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<CancelState>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that cancels itself once `checks` calls to [`Self::check`]
    /// have passed, capping how much work a run may do.
    #[must_use]
    pub fn after_checks(checks: usize) -> Self {
        Self(Arc::new(CancelState {
            canceled: AtomicBool::new(false),
            checks_left: Some(AtomicUsize::new(checks)),
        }))
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.canceled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.0.canceled.load(Ordering::Acquire)
    }

    /// Returns `Err(CatchmentError::Canceled)` once cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns `CatchmentError::Canceled` if [`Self::cancel`] has been called
    /// or the check allowance of the token is used up.
    pub fn check(&self) -> Result<()> {
        if let Some(left) = &self.0.checks_left {
            if left
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_err()
            {
                self.cancel();
            }
        }
        if self.is_canceled() {
            Err(CatchmentError::Canceled)
        } else {
            Ok(())
        }
    }
}

/// A described catchment run over one immutable parameter record.
pub struct CatchmentTask {
    description: String,
    params: CatchmentParams,
    reprojector: Arc<dyn Reproject + Send + Sync>,
}

impl CatchmentTask {
    /// Creates a task whose inputs are all in the analysis reference.
    #[must_use]
    pub fn new(description: impl Into<String>, params: CatchmentParams) -> Self {
        Self {
            description: description.into(),
            params,
            reprojector: Arc::new(SameCrs),
        }
    }

    /// Uses `reprojector` to move obstacles and origin into the analysis reference.
    #[must_use]
    pub fn with_reprojector(mut self, reprojector: Arc<dyn Reproject + Send + Sync>) -> Self {
        self.reprojector = reprojector;
        self
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn params(&self) -> &CatchmentParams {
        &self.params
    }

    /// Runs to completion on the calling thread.
    ///
    /// The start and the outcome are logged: success at info level with the
    /// duration, cancellation at warn level, and failures at error level.
    ///
    /// # Errors
    ///
    /// Returns a `PreconditionError` for unusable input,
    /// `CatchmentError::Canceled` if `cancel` was raised, or the first
    /// collaborator failure.
    pub fn run(&self, cancel: &CancelToken) -> Result<CatchmentResult> {
        let started = Instant::now();
        info!(target: "interface_catchment", "Started task \"{}\"", self.description);
        let outcome = self.execute(cancel, started);
        log_outcome(&self.description, &outcome, started.elapsed());
        outcome
    }

    fn execute(&self, cancel: &CancelToken, started: Instant) -> Result<CatchmentResult> {
        self.params.validate()?;

        let prepared = PrepareObstacles::new(&self.params, self.reprojector.as_ref()).execute(cancel)?;
        let relaxed = RelaxVisibility::new(
            &prepared,
            self.params.tolerances,
            self.params.resolution,
        )
        .execute(cancel)?;
        let aggregated = AggregateCatchment::new(&prepared, &relaxed.walkable).execute(cancel)?;

        let stats = RunStats {
            iterations: relaxed.iterations,
            vertices_inserted: relaxed.commits.inserted,
            vertices_replaced: relaxed.commits.replaced,
            candidates_rejected: relaxed.commits.rejected,
            elapsed: started.elapsed(),
        };
        Ok(CatchmentResult {
            network: aggregated.network,
            ic: aggregated.ic,
            origin: Point::from(prepared.origin),
            crs: self.params.analysis_crs.clone(),
            network_style: LayerStyle::highlight(),
            origin_style: LayerStyle::highlight(),
            frontier: relaxed.frontier,
            stats,
        })
    }

    /// Starts the run on a background thread.
    #[must_use]
    pub fn start(self) -> TaskHandle {
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let description = self.description.clone();
        let worker = thread::spawn(move || self.run(&token));
        TaskHandle {
            description,
            cancel,
            worker,
            started: Instant::now(),
        }
    }
}

/// How a background run ended.
#[derive(Debug)]
pub enum TaskOutcome {
    Completed(CatchmentResult),
    /// The run stopped because cancellation was requested.
    Canceled,
    Faulted(CatchmentError),
}

impl TaskOutcome {
    /// Converts into a `Result` on the caller's side; a canceled run yields
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the captured error of a faulted run.
    pub fn into_result(self) -> Result<Option<CatchmentResult>> {
        match self {
            Self::Completed(result) => Ok(Some(result)),
            Self::Canceled => Ok(None),
            Self::Faulted(err) => Err(err),
        }
    }
}

/// Handle to a run executing on a background thread.
pub struct TaskHandle {
    description: String,
    cancel: CancelToken,
    worker: JoinHandle<Result<CatchmentResult>>,
    started: Instant,
}

impl TaskHandle {
    /// Asks the run to stop at its next cancellation check.
    pub fn cancel(&self) {
        info!(target: "interface_catchment", "Task \"{}\" was canceled", self.description);
        self.cancel.cancel();
    }

    /// A clone of the token the run polls.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Blocks until the run ends and reports how it ended.
    ///
    /// The run logs its own outcome on the worker thread; only a panic on
    /// the worker is logged here, and it is captured as a fault.
    #[must_use]
    pub fn wait(self) -> TaskOutcome {
        match self.worker.join() {
            Ok(Ok(result)) => TaskOutcome::Completed(result),
            Ok(Err(err)) if err.is_canceled() => TaskOutcome::Canceled,
            Ok(Err(err)) => TaskOutcome::Faulted(err),
            Err(payload) => {
                let err = CatchmentError::Fault(panic_message(&*payload));
                log_failure(&self.description, &err, self.started.elapsed());
                TaskOutcome::Faulted(err)
            }
        }
    }
}

fn log_outcome(description: &str, outcome: &Result<CatchmentResult>, elapsed: Duration) {
    match outcome {
        Ok(result) => info!(
            target: "interface_catchment",
            ic = result.ic,
            "Task \"{description}\" completed in {:.3} s",
            elapsed.as_secs_f64()
        ),
        Err(err) => log_failure(description, err, elapsed),
    }
}

fn log_failure(description: &str, err: &CatchmentError, elapsed: Duration) {
    if err.is_canceled() {
        warn!(
            target: "interface_catchment",
            "Task \"{description}\" not successful but without exception \
             (probably the task was manually canceled by the user)"
        );
    } else {
        error!(
            target: "interface_catchment",
            "Task \"{description}\" Exception: {err} (after {:.3} s)",
            elapsed.as_secs_f64()
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_owned()
    }
}
