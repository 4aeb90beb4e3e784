//! Worker Supervisor
//!
//! Runs in the primary process. It forks a fixed pool of worker processes,
//! each re-executing the same program with the worker marker set, and then
//! watches them until the primary is told to stop.
//!
//! ## Lifecycle
//! - **Fork**: `worker_count` children are spawned up front. Spawning is
//!   fire-and-forget; the primary does not wait for a worker to start serving.
//! - **Monitor**: every child gets a monitor task that awaits its exit and
//!   reports a `WorkerExit` back to the supervisor loop.
//! - **Exit**: the departed pid and its status are logged and the worker is
//!   marked `Exited`.
//!
//! Workers are never restarted. The pool can only shrink over the lifetime of
//! the primary; a test or operator observing the live count relies on that.
//! An empty pool does not stop the primary either: only the shutdown signal does.
//!
//! When the primary stops, workers still alive are killed (their `Child`
//! handles are dropped with `kill_on_drop`). There is no drain phase.

use super::policy::{available_processors, worker_count};
use super::types::{ENV_WORKER_ID, WorkerExit, WorkerProcess, WorkerState};

use anyhow::{Context, Result};
use dashmap::DashMap;
use std::ffi::OsString;
use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Program a worker runs. Production uses the current executable.
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    program: OsString,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Re-executes this very binary; the child takes the worker branch.
    pub fn current_exe() -> Result<Self> {
        let exe = std::env::current_exe().context("Failed to resolve current executable")?;
        Ok(Self::new(exe))
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn build(&self, worker_id: usize) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .env(ENV_WORKER_ID, worker_id.to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // Workers should not outlive a primary that was killed outright.
        #[cfg(target_os = "linux")]
        unsafe {
            command.pre_exec(|| {
                if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM) != 0 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }

        command
    }
}

/// The primary's view of its workers.
#[derive(Debug, Default)]
pub struct WorkerPool {
    workers: DashMap<usize, WorkerProcess>,
}

impl WorkerPool {
    /// Every worker ever forked, ordered by worker id.
    pub fn workers(&self) -> Vec<WorkerProcess> {
        let mut workers: Vec<WorkerProcess> = self
            .workers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        workers.sort_by_key(|worker| worker.id);
        workers
    }

    pub fn live_workers(&self) -> Vec<WorkerProcess> {
        self.workers()
            .into_iter()
            .filter(WorkerProcess::is_live)
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.workers
            .iter()
            .filter(|entry| entry.value().is_live())
            .count()
    }

    /// Total number of workers forked, live or not.
    pub fn forked_count(&self) -> usize {
        self.workers.len()
    }

    pub fn get(&self, worker_id: usize) -> Option<WorkerProcess> {
        self.workers.get(&worker_id).map(|entry| entry.value().clone())
    }

    fn insert(&self, worker: WorkerProcess) {
        self.workers.insert(worker.id, worker);
    }

    fn mark_running(&self, worker_id: usize, pid: Option<u32>) {
        if let Some(mut worker) = self.workers.get_mut(&worker_id)
            && worker.state == WorkerState::Starting
        {
            worker.pid = pid;
            worker.state = WorkerState::Running;
        }
    }

    /// Returns false if the worker was already marked as exited.
    fn mark_exited(&self, exit: &WorkerExit) -> bool {
        match self.workers.get_mut(&exit.worker_id) {
            Some(mut worker) if worker.is_live() => {
                worker.state = WorkerState::Exited;
                worker.exit = Some(exit.clone());
                true
            }
            Some(_) => false,
            None => {
                tracing::debug!("Exit reported for unknown worker #{}", exit.worker_id);
                false
            }
        }
    }
}

pub struct WorkerSupervisor {
    command: WorkerCommand,
    worker_count: usize,
    pool: Arc<WorkerPool>,
}

impl WorkerSupervisor {
    /// Sizes the pool from the host: one worker per logical CPU, minus one.
    pub fn new(command: WorkerCommand) -> Self {
        Self::with_worker_count(command, worker_count(available_processors()))
    }

    pub fn with_worker_count(command: WorkerCommand, worker_count: usize) -> Self {
        Self {
            command,
            worker_count,
            pool: Arc::new(WorkerPool::default()),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn pool(&self) -> Arc<WorkerPool> {
        self.pool.clone()
    }

    /// Forks the pool and supervises it until `shutdown` resolves, whether or
    /// not any worker is still alive.
    ///
    /// Fails only if a worker cannot be forked at all; worker exits are
    /// logged and never turned into errors.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Primary {} is running", std::process::id());
        tracing::info!("Forking {} worker(s)", self.worker_count);

        let (exit_tx, mut exit_rx) = mpsc::unbounded_channel();
        let mut monitors = JoinSet::new();

        for worker_id in 0..self.worker_count {
            self.spawn_worker(worker_id, &mut monitors, exit_tx.clone())?;
        }
        drop(exit_tx);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(
                        "Shutdown requested with {} live worker(s)",
                        self.pool.live_count()
                    );
                    break;
                }
                exit = exit_rx.recv() => match exit {
                    Some(exit) => self.record_exit(exit),
                    None => {
                        tracing::warn!("All workers have exited, waiting for shutdown");
                        shutdown.as_mut().await;
                        break;
                    }
                },
            }
        }

        // Dropping the monitors drops their `Child` handles, killing live workers.
        monitors.shutdown().await;

        tracing::info!("Primary {} stopped", std::process::id());

        Ok(())
    }

    fn spawn_worker(
        &self,
        worker_id: usize,
        monitors: &mut JoinSet<()>,
        exits: mpsc::UnboundedSender<WorkerExit>,
    ) -> Result<()> {
        self.pool.insert(WorkerProcess::starting(worker_id));

        let mut child = match self.command.build(worker_id).spawn() {
            Ok(child) => child,
            Err(e) => {
                self.pool.mark_exited(&WorkerExit::unknown(worker_id, None));
                return Err(e).with_context(|| format!("Failed to fork worker #{}", worker_id));
            }
        };

        let pid = child.id();
        self.pool.mark_running(worker_id, pid);

        tracing::info!("Forked worker #{} (pid {:?})", worker_id, pid);

        monitors.spawn(async move {
            let exit = match child.wait().await {
                Ok(status) => WorkerExit::from_status(worker_id, pid, status),
                Err(e) => {
                    tracing::error!("Failed to wait for worker #{}: {}", worker_id, e);
                    WorkerExit::unknown(worker_id, pid)
                }
            };

            if exits.send(exit).is_err() {
                tracing::debug!("Supervisor gone before worker #{} exit was reported", worker_id);
            }
        });

        Ok(())
    }

    fn record_exit(&self, exit: WorkerExit) {
        if !self.pool.mark_exited(&exit) {
            return;
        }

        let pid = exit
            .pid
            .map(|pid| pid.to_string())
            .unwrap_or_else(|| "?".to_string());

        tracing::warn!("Worker {} died ({})", pid, exit.describe());
        tracing::info!(
            "Live workers: {}/{} (exited workers are not restarted)",
            self.pool.live_count(),
            self.pool.forked_count()
        );
    }
}
