use common::TaskError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    /// Sólo aparece si se configuró un tope de intentos de conexión.
    #[error("no se pudo conectar al coordinator después de {attempts} intentos: {source}")]
    ConnectFailed {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("error HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("respuesta inesperada {status} en {method} {endpoint}")]
    UnexpectedStatus {
        method: &'static str,
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error("la tarea terminó abruptamente: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("error de entrada/salida: {0}")]
    Io(#[from] std::io::Error),
}
