use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::connect::RetryPolicy;

#[derive(Parser, Debug)]
#[command(name = "worker")]
#[command(about = "Worker map/reduce: pide tareas al coordinator y las ejecuta")]
pub struct Cli {
    /// URL base del coordinator
    #[arg(long, env = "COORDINATOR_URL", default_value = "http://127.0.0.1:8080")]
    pub coordinator_url: String,

    /// Directorio base de `outputs_tmp/` y `outputs/`
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,

    /// Segundos entre intentos de conexión
    #[arg(long, default_value_t = 5)]
    pub retry_interval_secs: u64,

    /// Tope de intentos de conexión (sin tope si no se indica)
    #[arg(long)]
    pub max_connect_attempts: Option<u32>,

    /// Espera entre polls de reduce mientras la barrera no se cumple
    #[arg(long, default_value_t = 1000)]
    pub poll_interval_ms: u64,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Pide y ejecuta tareas hasta que no quede ninguna (default)
    Run,
    /// Consola interactiva: `GET map` / `GET reduce`
    Console,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub coordinator_url: String,
    pub work_dir: PathBuf,
    pub retry: RetryPolicy,
    pub poll_interval: Duration,
}

impl From<&Cli> for WorkerConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            coordinator_url: cli.coordinator_url.clone(),
            work_dir: cli.work_dir.clone(),
            retry: RetryPolicy {
                interval: Duration::from_secs(cli.retry_interval_secs),
                max_attempts: cli.max_connect_attempts,
            },
            poll_interval: Duration::from_millis(cli.poll_interval_ms),
        }
    }
}
