use serde::{Deserialize, Serialize};
use std::fmt;

/// Índice de una tarea dentro de su fase: [0, N) para map, [0, M) para reduce.
pub type TaskId = usize;

/* --------- Parámetros del job --------- */

/// Cantidad de tareas map (N) y reduce (M).
/// En el cable viajan como `{"N": .., "M": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParameters {
    #[serde(rename = "N")]
    pub map_tasks: usize,
    #[serde(rename = "M")]
    pub reduce_tasks: usize,
}

/* --------- Fases --------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Map,
    Reduce,
}

impl Phase {
    /// Ruta HTTP de la fase (`/map` o `/reduce`).
    pub fn endpoint(self) -> &'static str {
        match self {
            Phase::Map => "/map",
            Phase::Reduce => "/reduce",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Map => write!(f, "map"),
            Phase::Reduce => write!(f, "reduce"),
        }
    }
}

/* --------- Asignación y reporte de tareas --------- */

/// Cuerpo de un 200 en `GET /map` o `GET /reduce`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub task_id: TaskId,
    pub filenames: Vec<String>,
}

/// Resultado de pedir una tarea.
/// `Exhausted` y `PhaseNotReady` son señales de control, no errores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Assigned(TaskAssignment),
    /// Ya se repartieron todas las tareas de la fase (HTTP 300).
    Exhausted,
    /// La barrera map→reduce todavía no se cumple (HTTP 303).
    PhaseNotReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompleteRequest {
    pub task_id: TaskId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompleteResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_parameters_usa_claves_en_mayuscula() {
        let params = JobParameters {
            map_tasks: 2,
            reduce_tasks: 3,
        };
        assert_eq!(serde_json::to_value(params).unwrap(), json!({"N": 2, "M": 3}));

        let parsed: JobParameters = serde_json::from_value(json!({"N": 4, "M": 6})).unwrap();
        assert_eq!(parsed.map_tasks, 4);
        assert_eq!(parsed.reduce_tasks, 6);
    }

    #[test]
    fn task_assignment_tiene_el_formato_del_cable() {
        let body = json!({"task_id": 1, "filenames": ["inputs/a.txt", "inputs/c.txt"]});
        let parsed: TaskAssignment = serde_json::from_value(body).unwrap();

        assert_eq!(parsed.task_id, 1);
        assert_eq!(parsed.filenames, vec!["inputs/a.txt", "inputs/c.txt"]);
    }

    #[test]
    fn phase_endpoint_y_display() {
        assert_eq!(Phase::Map.endpoint(), "/map");
        assert_eq!(Phase::Reduce.endpoint(), "/reduce");
        assert_eq!(Phase::Reduce.to_string(), "reduce");
    }
}
