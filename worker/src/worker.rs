use common::{
    wordcount, JobParameters, Layout, PartitionTable, Phase, PollOutcome, TaskAssignment, TaskId,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::client::CoordinatorClient;
use crate::config::WorkerConfig;
use crate::connect::connect;
use crate::error::WorkerError;

/// Qué pasó en un paso de poll + ejecución.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Se ejecutó y reportó la tarea con este id.
    Ran(TaskId),
    Exhausted,
    PhaseNotReady,
}

/// Tareas que ejecutó este worker en una corrida completa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub map_tasks: usize,
    pub reduce_tasks: usize,
}

pub struct Worker {
    client: CoordinatorClient,
    params: JobParameters,
    // se calcula una vez a partir de M y no cambia
    table: PartitionTable,
    layout: Layout,
    poll_interval: Duration,
}

impl Worker {
    /// Conecta (con reintentos), obtiene (N, M) y arma la tabla de particiones.
    pub async fn start(config: &WorkerConfig) -> Result<Self, WorkerError> {
        let client = CoordinatorClient::new(&config.coordinator_url)?;
        let params = connect(&client, config.retry).await?;

        let host = hostname::get()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        info!("worker en {} listo contra {}", host, client.base_url());

        Ok(Self::with_parameters(
            client,
            params,
            Layout::new(&config.work_dir),
            config.poll_interval,
        ))
    }

    pub fn with_parameters(
        client: CoordinatorClient,
        params: JobParameters,
        layout: Layout,
        poll_interval: Duration,
    ) -> Self {
        Self {
            table: PartitionTable::new(params.reduce_tasks),
            client,
            params,
            layout,
            poll_interval,
        }
    }

    pub fn parameters(&self) -> JobParameters {
        self.params
    }

    pub fn partition_table(&self) -> &PartitionTable {
        &self.table
    }

    pub fn client(&self) -> &CoordinatorClient {
        &self.client
    }

    /// Cuenta palabras de la tarea, escribe las M particiones y reporta.
    pub async fn map_task(&self, assignment: TaskAssignment) -> Result<(), WorkerError> {
        let TaskAssignment { task_id, filenames } = assignment;
        info!("map {}: procesando {} archivos", task_id, filenames.len());

        let table = self.table.clone();
        let layout = self.layout.clone();
        tokio::task::spawn_blocking(move || {
            wordcount::run_map_task(task_id, &filenames, &table, &layout)
        })
        .await??;

        self.client.report_complete(Phase::Map, task_id).await?;
        info!("map {} completada", task_id);
        Ok(())
    }

    /// Mezcla las N particiones de la tarea, escribe la salida ordenada y reporta.
    pub async fn reduce_task(&self, assignment: TaskAssignment) -> Result<(), WorkerError> {
        let TaskAssignment { task_id, filenames } = assignment;
        info!("reduce {}: mezclando {} particiones", task_id, filenames.len());

        let layout = self.layout.clone();
        let output = tokio::task::spawn_blocking(move || {
            wordcount::run_reduce_task(task_id, &filenames, &layout)
        })
        .await??;

        self.client.report_complete(Phase::Reduce, task_id).await?;
        info!("reduce {} completada -> {}", task_id, output.display());
        Ok(())
    }

    /// Pide una tarea de la fase y, si llega, la ejecuta.
    pub async fn poll_and_run(&self, phase: Phase) -> Result<PollStep, WorkerError> {
        match self.client.poll(phase).await? {
            PollOutcome::Assigned(assignment) => {
                let task_id = assignment.task_id;
                match phase {
                    Phase::Map => self.map_task(assignment).await?,
                    Phase::Reduce => self.reduce_task(assignment).await?,
                }
                Ok(PollStep::Ran(task_id))
            }
            PollOutcome::Exhausted => Ok(PollStep::Exhausted),
            PollOutcome::PhaseNotReady => Ok(PollStep::PhaseNotReady),
        }
    }

    /// Loop completo: map hasta agotarse, después reduce hasta agotarse.
    /// Si la barrera no se cumple, espera `poll_interval` y vuelve a pedir.
    /// Un fallo de tarea corta la corrida.
    pub async fn run_until_done(&self) -> Result<RunSummary, WorkerError> {
        let mut summary = RunSummary::default();

        while let PollStep::Ran(_) = self.poll_and_run(Phase::Map).await? {
            summary.map_tasks += 1;
        }
        info!("no quedan tareas map por repartir");

        loop {
            match self.poll_and_run(Phase::Reduce).await? {
                PollStep::Ran(_) => summary.reduce_tasks += 1,
                PollStep::PhaseNotReady => {
                    debug!("barrera map→reduce sin cumplir, esperando {:?}", self.poll_interval);
                    sleep(self.poll_interval).await;
                }
                PollStep::Exhausted => break,
            }
        }

        info!(
            "fin: {} tareas map y {} reduce ejecutadas por este worker",
            summary.map_tasks, summary.reduce_tasks
        );
        Ok(summary)
    }
}
