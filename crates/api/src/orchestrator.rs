//! The run orchestrator: a bounded worker pool that accepts validated
//! requests, queues them FIFO, and drives each solve to exactly one terminal
//! registry write.
//!
//! Workers are plain tokio tasks sharing one queue receiver; the CPU-bound
//! solve itself runs on a blocking thread under a hard time ceiling. A
//! process-wide cancellation token drains everything to a terminal state on
//! shutdown, so no run is left non-terminal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rosterd_core::request::SolveRequest;
use rosterd_core::run::RunStatus;
use rosterd_db::models::run::Run;
use rosterd_db::repositories::{CatalogRepo, RunRepo};
use rosterd_db::{DbPool, RepoError};
use rosterd_solver::{run_solve, DriverConfig, MilpBackend};
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Extraction tail allowed past the solver's own time limit before the
/// worker force-finalises the run.
const HARD_CEILING_GRACE: Duration = Duration::from_secs(30);

struct QueuedRun {
    run_id: String,
    request: SolveRequest,
    enqueued_at: Instant,
}

/// Queue observability for operations.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
    pub depth: usize,
    pub capacity: usize,
    pub workers: usize,
    pub oldest_wait_secs: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] rosterd_core::error::CoreError),

    #[error("scheduling queue is full")]
    QueueFull,

    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct Orchestrator {
    pool: DbPool,
    tx: mpsc::Sender<QueuedRun>,
    rx: Arc<Mutex<mpsc::Receiver<QueuedRun>>>,
    /// Runs accepted but not yet picked up by a worker.
    pending: Arc<Mutex<HashMap<String, Instant>>>,
    cancel: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
    capacity: usize,
    worker_count: usize,
}

impl Orchestrator {
    /// Spawn the worker pool and return the shared handle.
    pub fn start(
        pool: DbPool,
        backend: Arc<dyn MilpBackend>,
        driver: Arc<DriverConfig>,
        workers: usize,
        queue_bound: usize,
    ) -> Arc<Orchestrator> {
        let capacity = queue_bound.max(1);
        let worker_count = workers.max(1);
        let (tx, rx) = mpsc::channel::<QueuedRun>(capacity);
        let rx = Arc::new(Mutex::new(rx));
        let pending: Arc<Mutex<HashMap<String, Instant>>> = Arc::new(Mutex::new(HashMap::new()));
        let cancel = CancellationToken::new();

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            handles.push(tokio::spawn(worker_loop(
                worker_id,
                pool.clone(),
                Arc::clone(&backend),
                Arc::clone(&driver),
                Arc::clone(&rx),
                Arc::clone(&pending),
                cancel.clone(),
            )));
        }
        tracing::info!(workers = worker_count, queue_bound = capacity, "orchestrator started");

        Arc::new(Orchestrator {
            pool,
            tx,
            rx,
            pending,
            cancel,
            workers: Mutex::new(handles),
            capacity,
            worker_count,
        })
    }

    /// Validate, register, and enqueue one request.
    ///
    /// The queue slot is reserved before the registry row is created so a
    /// saturated queue rejects the submission without leaving a stray
    /// QUEUED run behind.
    pub async fn submit(&self, request: SolveRequest) -> Result<Run, SubmitError> {
        request.validate()?;

        let permit = self
            .tx
            .try_reserve()
            .map_err(|_| SubmitError::QueueFull)?;

        let run = RunRepo::create(&self.pool, &request).await?;
        self.pending
            .lock()
            .await
            .insert(run.run_id.clone(), Instant::now());
        permit.send(QueuedRun {
            run_id: run.run_id.clone(),
            request,
            enqueued_at: Instant::now(),
        });

        tracing::info!(run_id = %run.run_id, "run queued");
        Ok(run)
    }

    pub async fn queue_stats(&self) -> QueueStats {
        let pending = self.pending.lock().await;
        let oldest_wait_secs = pending
            .values()
            .map(|enqueued| enqueued.elapsed().as_secs())
            .max();
        QueueStats {
            depth: pending.len(),
            capacity: self.capacity,
            workers: self.worker_count,
            oldest_wait_secs,
        }
    }

    /// Stop the pool and leave no run non-terminal: in-flight solves are
    /// finalised as ERROR "cancelled" by their workers, queued runs as
    /// ERROR "not started" here.
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let handles: Vec<JoinHandle<()>> = self.workers.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }

        let mut rx = self.rx.lock().await;
        while let Ok(item) = rx.try_recv() {
            self.pending.lock().await.remove(&item.run_id);
            finalize_logged(&self.pool, &item.run_id, RunStatus::Error, None, &[], "not started")
                .await;
        }
        tracing::info!("orchestrator stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    pool: DbPool,
    backend: Arc<dyn MilpBackend>,
    driver: Arc<DriverConfig>,
    rx: Arc<Mutex<mpsc::Receiver<QueuedRun>>>,
    pending: Arc<Mutex<HashMap<String, Instant>>>,
    cancel: CancellationToken,
) {
    loop {
        let item = {
            let mut rx = rx.lock().await;
            tokio::select! {
                () = cancel.cancelled() => return,
                item = rx.recv() => match item {
                    Some(item) => item,
                    None => return,
                },
            }
        };
        pending.lock().await.remove(&item.run_id);
        tracing::info!(
            worker_id,
            run_id = %item.run_id,
            wait_secs = item.enqueued_at.elapsed().as_secs(),
            "run picked up",
        );

        tokio::select! {
            () = cancel.cancelled() => {
                // The abandoned solve may still finish on its blocking
                // thread; its late finalize loses the status CAS.
                finalize_logged(&pool, &item.run_id, RunStatus::Error, None, &[], "cancelled")
                    .await;
            }
            () = process_run(&pool, Arc::clone(&backend), Arc::clone(&driver), &item) => {}
        }
    }
}

/// One run end to end: mark running, snapshot the catalog, solve on a
/// blocking thread under the hard ceiling, finalise once.
async fn process_run(
    pool: &DbPool,
    backend: Arc<dyn MilpBackend>,
    driver: Arc<DriverConfig>,
    item: &QueuedRun,
) {
    match RunRepo::mark_running(pool, &item.run_id).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(run_id = %item.run_id, "run already left QUEUED before start");
        }
        Err(e) => {
            tracing::error!(run_id = %item.run_id, error = %e, "failed to mark run running");
            return;
        }
    }

    let snapshot = match CatalogRepo::snapshot(
        pool,
        item.request.horizon_start,
        item.request.horizon_days,
    )
    .await
    {
        Ok(snapshot) => snapshot,
        Err(e) => {
            finalize_logged(
                pool,
                &item.run_id,
                RunStatus::Error,
                None,
                &[],
                &format!("catalog snapshot failed: {e}"),
            )
            .await;
            return;
        }
    };

    let ceiling = Duration::from_secs(item.request.solver_time_limit) + HARD_CEILING_GRACE;
    let request = item.request.clone();
    let solve = tokio::task::spawn_blocking(move || {
        run_solve(backend.as_ref(), &snapshot, &request, &driver)
    });

    match tokio::time::timeout(ceiling, solve).await {
        Ok(Ok(report)) => {
            finalize_logged(
                pool,
                &item.run_id,
                report.status,
                report.objective_value,
                &report.assignments,
                &report.logs,
            )
            .await;
        }
        Ok(Err(join_error)) => {
            finalize_logged(
                pool,
                &item.run_id,
                RunStatus::Error,
                None,
                &[],
                &format!("solver task failed: {join_error}"),
            )
            .await;
        }
        Err(_elapsed) => {
            finalize_logged(
                pool,
                &item.run_id,
                RunStatus::Error,
                None,
                &[],
                "solver exceeded the hard time ceiling",
            )
            .await;
        }
    }
}

async fn finalize_logged(
    pool: &DbPool,
    run_id: &str,
    status: RunStatus,
    objective_value: Option<f64>,
    assignments: &[rosterd_core::catalog::RawAssignment],
    logs: &str,
) {
    match RunRepo::finalize(pool, run_id, status, objective_value, assignments, logs).await {
        Ok(()) => {
            tracing::info!(run_id = %run_id, status = %status, "run finalised");
        }
        Err(RepoError::TerminalConflict(_)) => {
            tracing::error!(run_id = %run_id, "attempted double finalize on a terminal run");
        }
        Err(e) => {
            tracing::error!(run_id = %run_id, error = %e, "failed to finalise run");
        }
    }
}
