use serde::{Deserialize, Serialize};
use std::process::ExitStatus;

/// Environment variable the primary sets on each child it forks.
///
/// Its presence (with the worker's index as value) is what makes a process a
/// worker; operators never set it themselves.
pub const ENV_WORKER_ID: &str = "USER_CLUSTER_WORKER_ID";

/// What this process is, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Worker { id: usize },
}

impl Role {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// A marker that is present but unparsable still means "worker": only the
    /// primary ever sets it.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(ENV_WORKER_ID) {
            Some(raw) => Role::Worker {
                id: raw.trim().parse().unwrap_or_else(|_| {
                    tracing::warn!("Unparsable {} value {:?}, using 0", ENV_WORKER_ID, raw);
                    0
                }),
            },
            None => Role::Primary,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkerState {
    /// Fork requested, no pid observed yet.
    Starting,
    /// Process is alive as far as the primary knows.
    Running,
    /// Process is gone. Terminal: workers are never restarted.
    Exited,
}

/// How a worker process ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerExit {
    pub worker_id: usize,
    pub pid: Option<u32>,
    /// Exit code, when the process exited on its own.
    pub code: Option<i32>,
    /// Terminating signal, when it was killed (Unix only).
    pub signal: Option<i32>,
}

impl WorkerExit {
    pub fn from_status(worker_id: usize, pid: Option<u32>, status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            worker_id,
            pid,
            code: status.code(),
            signal,
        }
    }

    /// Exit whose status could not be collected.
    pub fn unknown(worker_id: usize, pid: Option<u32>) -> Self {
        Self {
            worker_id,
            pid,
            code: None,
            signal: None,
        }
    }

    pub fn describe(&self) -> String {
        match (self.code, self.signal) {
            (Some(code), _) => format!("exit code {}", code),
            (None, Some(signal)) => format!("signal {}", signal),
            (None, None) => "unknown status".to_string(),
        }
    }
}

/// A forked worker as tracked by the primary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerProcess {
    pub id: usize,
    pub pid: Option<u32>,
    pub state: WorkerState,
    pub exit: Option<WorkerExit>,
}

impl WorkerProcess {
    pub fn starting(id: usize) -> Self {
        Self {
            id,
            pid: None,
            state: WorkerState::Starting,
            exit: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.state != WorkerState::Exited
    }
}
