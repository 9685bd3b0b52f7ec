use common::JobParameters;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::client::CoordinatorClient;
use crate::error::WorkerError;

pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Espera fija entre intentos; sin tope de intentos por defecto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            max_attempts: None,
        }
    }
}

#[derive(Debug)]
enum ConnectState {
    Connecting { attempt: u32 },
    Backoff { attempt: u32 },
    Connected(JobParameters),
}

/// Pide `/parameters` hasta que el coordinator responda.
/// Sólo los fallos de conexión se reintentan; cualquier otro error sale directo.
pub async fn connect(
    client: &CoordinatorClient,
    policy: RetryPolicy,
) -> Result<JobParameters, WorkerError> {
    let mut state = ConnectState::Connecting { attempt: 1 };

    loop {
        state = match state {
            ConnectState::Connecting { attempt } => match client.parameters().await {
                Ok(params) => ConnectState::Connected(params),
                Err(WorkerError::Http(e)) if e.is_connect() => {
                    if policy.max_attempts.is_some_and(|max| attempt >= max) {
                        return Err(WorkerError::ConnectFailed {
                            attempts: attempt,
                            source: e,
                        });
                    }
                    warn!(
                        "conexión a {} fallida (intento {}), reintentando en {:?}...",
                        client.base_url(),
                        attempt,
                        policy.interval
                    );
                    ConnectState::Backoff { attempt }
                }
                Err(e) => return Err(e),
            },
            ConnectState::Backoff { attempt } => {
                sleep(policy.interval).await;
                ConnectState::Connecting {
                    attempt: attempt + 1,
                }
            }
            ConnectState::Connected(params) => {
                info!(
                    "conectado a {} (N={}, M={})",
                    client.base_url(),
                    params.map_tasks,
                    params.reduce_tasks
                );
                return Ok(params);
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    async fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn con_tope_de_intentos_se_rinde() {
        let port = free_port().await;
        let client = CoordinatorClient::new(&format!("http://127.0.0.1:{}", port)).unwrap();
        let policy = RetryPolicy {
            interval: Duration::from_millis(10),
            max_attempts: Some(3),
        };

        let err = connect(&client, policy).await.unwrap_err();

        assert!(matches!(err, WorkerError::ConnectFailed { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn reintenta_hasta_que_el_coordinator_levanta() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = CoordinatorClient::new(&format!("http://{}", addr)).unwrap();
        let policy = RetryPolicy {
            interval: Duration::from_millis(50),
            max_attempts: None,
        };

        // el servidor aparece un rato después del primer intento
        tokio::spawn(async move {
            sleep(Duration::from_millis(120)).await;
            let app = Router::new().route("/parameters", get(|| async { Json(json!({"N": 1, "M": 2})) }));
            let listener = TcpListener::bind(addr).await.unwrap();
            axum::serve(listener, app).await.unwrap();
        });

        let params = connect(&client, policy).await.unwrap();

        assert_eq!(
            params,
            JobParameters {
                map_tasks: 1,
                reduce_tasks: 2
            }
        );
    }

    #[test]
    fn default_es_cinco_segundos_sin_tope() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(5));
        assert_eq!(policy.max_attempts, None);
    }
}
