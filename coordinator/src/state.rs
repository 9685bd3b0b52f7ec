// coordinator/src/state.rs

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use common::{partition, JobParameters, Layout, Phase, PollOutcome, TaskAssignment, TaskId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Unassigned,
    Assigned,
    Completed,
}

/// Registro de una tarea. `input_files` se conserva después de asignarla.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub status: TaskStatus,
    pub input_files: Vec<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    fn new(input_files: Vec<String>) -> Self {
        Self {
            status: TaskStatus::Unassigned,
            input_files,
            assigned_at: None,
            completed_at: None,
        }
    }
}

/// Tareas de una fase + contador de asignación (siguiente id a entregar).
#[derive(Debug, Clone)]
pub struct PhaseBoard {
    next: usize,
    tasks: Vec<TaskRecord>,
}

impl PhaseBoard {
    fn new(inputs: Vec<Vec<String>>) -> Self {
        Self {
            next: 0,
            tasks: inputs.into_iter().map(TaskRecord::new).collect(),
        }
    }

    /// Valor actual del contador de asignación.
    pub fn next(&self) -> usize {
        self.next
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn all_assigned(&self) -> bool {
        self.next == self.tasks.len()
    }

    pub fn all_completed(&self) -> bool {
        self.tasks
            .iter()
            .all(|t| t.status == TaskStatus::Completed)
    }

    fn assign_next(&mut self) -> Option<TaskAssignment> {
        let task_id = self.next;
        let record = self.tasks.get_mut(task_id)?;

        // un report adelantado no se pisa: Completed nunca vuelve atrás
        if record.status == TaskStatus::Unassigned {
            record.status = TaskStatus::Assigned;
        }
        record.assigned_at = Some(Utc::now());
        self.next += 1;

        Some(TaskAssignment {
            task_id,
            filenames: record.input_files.clone(),
        })
    }

    fn mark_completed(&mut self, task_id: TaskId) -> bool {
        match self.tasks.get_mut(task_id) {
            Some(record) => {
                record.status = TaskStatus::Completed;
                record.completed_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }
}

/// Regla que decide cuándo se pueden repartir tareas reduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BarrierPolicy {
    /// El contador map llegó a N (todas asignadas, no necesariamente terminadas).
    #[default]
    #[value(name = "assigned")]
    AllAssigned,
    /// Todas las tareas map reportaron Completed.
    #[value(name = "completed")]
    AllCompleted,
}

impl BarrierPolicy {
    pub fn is_satisfied(self, map: &PhaseBoard) -> bool {
        match self {
            BarrierPolicy::AllAssigned => map.all_assigned(),
            BarrierPolicy::AllCompleted => map.all_completed(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskBoard {
    pub map: PhaseBoard,
    pub reduce: PhaseBoard,
}

impl TaskBoard {
    fn phase_mut(&mut self, phase: Phase) -> &mut PhaseBoard {
        match phase {
            Phase::Map => &mut self.map,
            Phase::Reduce => &mut self.reduce,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    // inmutables después de construir
    params: JobParameters,
    barrier: BarrierPolicy,
    // contadores y registros de ambas fases, bajo un único lock
    board: Arc<Mutex<TaskBoard>>,
}

impl AppState {
    /// Arma todas las tareas de una vez:
    /// - N = min(map_tasks pedido, archivos descubiertos)
    /// - archivos de entrada repartidos round robin entre las N tareas map
    /// - para cada reduce r, los N nombres `mp-<m>-<r>`
    pub fn new(
        files: &[String],
        map_tasks: usize,
        reduce_tasks: usize,
        layout: &Layout,
        barrier: BarrierPolicy,
    ) -> Self {
        let map_tasks = map_tasks.min(files.len());
        let params = JobParameters {
            map_tasks,
            reduce_tasks,
        };

        let map_inputs = partition::assign_round_robin(files, map_tasks);
        let reduce_inputs = (0..reduce_tasks)
            .map(|r| layout.reduce_inputs(map_tasks, r))
            .collect();

        let board = TaskBoard {
            map: PhaseBoard::new(map_inputs),
            reduce: PhaseBoard::new(reduce_inputs),
        };

        Self {
            params,
            barrier,
            board: Arc::new(Mutex::new(board)),
        }
    }

    pub fn parameters(&self) -> JobParameters {
        self.params
    }

    pub fn barrier(&self) -> BarrierPolicy {
        self.barrier
    }

    fn lock(&self) -> MutexGuard<'_, TaskBoard> {
        // cada mutación es una sola escritura, un panic no deja el tablero a medias
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn poll_map(&self) -> PollOutcome {
        let mut board = self.lock();
        Self::assign(&mut board, Phase::Map)
    }

    pub fn poll_reduce(&self) -> PollOutcome {
        let mut board = self.lock();
        if !self.barrier.is_satisfied(&board.map) {
            debug!(
                "reduce pedido antes de la barrera ({}/{} map asignadas)",
                board.map.next(),
                self.params.map_tasks
            );
            return PollOutcome::PhaseNotReady;
        }
        Self::assign(&mut board, Phase::Reduce)
    }

    pub fn report_map_complete(&self, task_id: TaskId) {
        self.report(Phase::Map, task_id);
    }

    pub fn report_reduce_complete(&self, task_id: TaskId) {
        self.report(Phase::Reduce, task_id);
    }

    /// Copia consistente de ambas fases.
    pub fn snapshot(&self) -> TaskBoard {
        self.lock().clone()
    }

    fn assign(board: &mut TaskBoard, phase: Phase) -> PollOutcome {
        match board.phase_mut(phase).assign_next() {
            Some(assignment) => {
                debug!(
                    "asignando tarea {} {} ({} archivos)",
                    phase,
                    assignment.task_id,
                    assignment.filenames.len()
                );
                PollOutcome::Assigned(assignment)
            }
            None => PollOutcome::Exhausted,
        }
    }

    fn report(&self, phase: Phase, task_id: TaskId) {
        let mut board = self.lock();
        let tasks = board.phase_mut(phase);
        let was_done = tasks.all_completed();

        if !tasks.mark_completed(task_id) {
            warn!("reporte de tarea {} {} inexistente, se ignora", phase, task_id);
            return;
        }
        debug!("tarea {} {} completada", phase, task_id);

        if !was_done && tasks.all_completed() {
            info!("fase {} completa ({} tareas)", phase, tasks.tasks().len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    fn files(n: usize) -> Vec<String> {
        (0..n).map(|j| format!("inputs/f{}.txt", j)).collect()
    }

    fn state(n_files: usize, n: usize, m: usize, barrier: BarrierPolicy) -> AppState {
        AppState::new(&files(n_files), n, m, &Layout::new("w"), barrier)
    }

    fn assigned(outcome: PollOutcome) -> TaskAssignment {
        match outcome {
            PollOutcome::Assigned(a) => a,
            other => panic!("esperaba Assigned, obtuve {:?}", other),
        }
    }

    #[test]
    fn n_se_recorta_a_la_cantidad_de_archivos() {
        let s = state(2, 5, 3, BarrierPolicy::AllAssigned);
        assert_eq!(
            s.parameters(),
            JobParameters {
                map_tasks: 2,
                reduce_tasks: 3
            }
        );
    }

    #[test]
    fn map_reparte_archivos_round_robin_en_orden() {
        let s = state(7, 3, 2, BarrierPolicy::AllAssigned);

        let t0 = assigned(s.poll_map());
        let t1 = assigned(s.poll_map());
        let t2 = assigned(s.poll_map());

        assert_eq!(t0.task_id, 0);
        assert_eq!(t0.filenames, vec!["inputs/f0.txt", "inputs/f3.txt", "inputs/f6.txt"]);
        assert_eq!(t1.task_id, 1);
        assert_eq!(t1.filenames, vec!["inputs/f1.txt", "inputs/f4.txt"]);
        assert_eq!(t2.task_id, 2);
        assert_eq!(t2.filenames, vec!["inputs/f2.txt", "inputs/f5.txt"]);
    }

    #[test]
    fn map_se_agota_despues_de_n_asignaciones() {
        let s = state(3, 3, 1, BarrierPolicy::AllAssigned);
        for _ in 0..3 {
            assigned(s.poll_map());
        }
        assert_eq!(s.poll_map(), PollOutcome::Exhausted);
        assert_eq!(s.poll_map(), PollOutcome::Exhausted);
    }

    #[test]
    fn reduce_espera_al_contador_map_no_a_las_completadas() {
        let s = state(2, 2, 2, BarrierPolicy::AllAssigned);

        assert_eq!(s.poll_reduce(), PollOutcome::PhaseNotReady);

        // completar la tarea 0 sin haber asignado la 1 no abre la barrera
        assigned(s.poll_map());
        s.report_map_complete(0);
        assert_eq!(s.poll_reduce(), PollOutcome::PhaseNotReady);

        // la 1 queda Assigned (nunca Completed) y aun así se abre
        assigned(s.poll_map());
        let r0 = assigned(s.poll_reduce());
        assert_eq!(r0.task_id, 0);
        assert_eq!(r0.filenames, vec!["w/outputs_tmp/mp-0-0", "w/outputs_tmp/mp-1-0"]);

        let snap = s.snapshot();
        assert_eq!(snap.map.tasks()[1].status, TaskStatus::Assigned);
    }

    #[test]
    fn reduce_se_agota_despues_de_m_asignaciones() {
        let s = state(1, 1, 3, BarrierPolicy::AllAssigned);
        assigned(s.poll_map());

        let ids: Vec<TaskId> = (0..3).map(|_| assigned(s.poll_reduce()).task_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(s.poll_reduce(), PollOutcome::Exhausted);
    }

    #[test]
    fn barrera_por_completadas_espera_todos_los_reportes() {
        let s = state(2, 2, 1, BarrierPolicy::AllCompleted);
        assigned(s.poll_map());
        assigned(s.poll_map());

        assert_eq!(s.poll_reduce(), PollOutcome::PhaseNotReady);
        s.report_map_complete(1);
        assert_eq!(s.poll_reduce(), PollOutcome::PhaseNotReady);
        s.report_map_complete(0);
        assert_eq!(assigned(s.poll_reduce()).task_id, 0);
    }

    #[test]
    fn sin_archivos_no_hay_map_y_reduce_queda_disponible() {
        let s = state(0, 4, 2, BarrierPolicy::AllAssigned);

        assert_eq!(s.parameters().map_tasks, 0);
        assert_eq!(s.poll_map(), PollOutcome::Exhausted);
        let r0 = assigned(s.poll_reduce());
        assert!(r0.filenames.is_empty());
    }

    #[test]
    fn report_es_idempotente_y_conserva_los_archivos() {
        let s = state(2, 1, 1, BarrierPolicy::AllAssigned);
        assigned(s.poll_map());

        s.report_map_complete(0);
        s.report_map_complete(0);

        let snap = s.snapshot();
        let record = &snap.map.tasks()[0];
        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(record.input_files, vec!["inputs/f0.txt", "inputs/f1.txt"]);
        assert!(record.assigned_at.is_some());
        assert!(record.completed_at.is_some());
    }

    #[test]
    fn report_de_id_fuera_de_rango_se_ignora() {
        let s = state(1, 1, 1, BarrierPolicy::AllAssigned);
        s.report_reduce_complete(7);

        let snap = s.snapshot();
        assert_eq!(snap.reduce.tasks()[0].status, TaskStatus::Unassigned);
        assert_eq!(snap.reduce.next(), 0);
    }

    #[test]
    fn report_adelantado_no_cambia_el_orden_de_asignacion() {
        let s = state(2, 2, 1, BarrierPolicy::AllAssigned);
        s.report_map_complete(0);

        let t0 = assigned(s.poll_map());
        assert_eq!(t0.task_id, 0);
        assert_eq!(s.snapshot().map.tasks()[0].status, TaskStatus::Completed);
    }

    #[test]
    fn pollers_concurrentes_nunca_reciben_el_mismo_id() {
        let s = state(64, 64, 16, BarrierPolicy::AllAssigned);

        let map_ids: Vec<TaskId> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let s = s.clone();
                    scope.spawn(move || {
                        let mut got = Vec::new();
                        while let PollOutcome::Assigned(a) = s.poll_map() {
                            got.push(a.task_id);
                        }
                        got
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        assert_eq!(map_ids.len(), 64);
        assert_eq!(map_ids.iter().collect::<HashSet<_>>().len(), 64);

        let reduce_ids: Vec<TaskId> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let s = s.clone();
                    scope.spawn(move || {
                        let mut got = Vec::new();
                        while let PollOutcome::Assigned(a) = s.poll_reduce() {
                            got.push(a.task_id);
                        }
                        got
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        assert_eq!(reduce_ids.len(), 16);
        assert_eq!(reduce_ids.iter().collect::<HashSet<_>>().len(), 16);
    }
}
