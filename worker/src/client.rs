use common::{
    JobParameters, Phase, PollOutcome, TaskAssignment, TaskCompleteRequest, TaskCompleteResponse,
    TaskId,
};
use reqwest::{redirect, Client, StatusCode};

use crate::error::WorkerError;

/// Cliente HTTP del protocolo del coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorClient {
    http: Client,
    base_url: String,
}

impl CoordinatorClient {
    pub fn new(base_url: &str) -> Result<Self, WorkerError> {
        // 300 y 303 son señales del protocolo, no redirecciones a seguir
        let http = Client::builder().redirect(redirect::Policy::none()).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// `GET /parameters`
    pub async fn parameters(&self) -> Result<JobParameters, WorkerError> {
        let resp = self.http.get(self.url("/parameters")).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(WorkerError::UnexpectedStatus {
                method: "GET",
                endpoint: "/parameters",
                status: resp.status(),
            });
        }
        Ok(resp.json().await?)
    }

    /// `GET /map` o `GET /reduce`
    pub async fn poll(&self, phase: Phase) -> Result<PollOutcome, WorkerError> {
        let resp = self.http.get(self.url(phase.endpoint())).send().await?;

        match (phase, resp.status()) {
            (_, StatusCode::OK) => {
                let assignment: TaskAssignment = resp.json().await?;
                Ok(PollOutcome::Assigned(assignment))
            }
            (_, StatusCode::MULTIPLE_CHOICES) => Ok(PollOutcome::Exhausted),
            (Phase::Reduce, StatusCode::SEE_OTHER) => Ok(PollOutcome::PhaseNotReady),
            (_, status) => Err(WorkerError::UnexpectedStatus {
                method: "GET",
                endpoint: phase.endpoint(),
                status,
            }),
        }
    }

    /// `GET` a una ruta cualquiera, sin interpretar la respuesta.
    /// La consola la usa para reenviar rutas que no son del protocolo.
    pub async fn get_status(&self, path: &str) -> Result<StatusCode, WorkerError> {
        let path = format!("/{}", path.trim_start_matches('/'));
        let resp = self.http.get(self.url(&path)).send().await?;
        Ok(resp.status())
    }

    /// `POST /map` o `POST /reduce` con `{"task_id": ..}`
    pub async fn report_complete(&self, phase: Phase, task_id: TaskId) -> Result<(), WorkerError> {
        let resp = self
            .http
            .post(self.url(phase.endpoint()))
            .json(&TaskCompleteRequest { task_id })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(WorkerError::UnexpectedStatus {
                method: "POST",
                endpoint: phase.endpoint(),
                status: resp.status(),
            });
        }

        let _ack: TaskCompleteResponse = resp.json().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::get, Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    /// Coordinator falso: /map agotado, /reduce todavía no listo, /parameters fijo.
    async fn stub_coordinator() -> String {
        let app = Router::new()
            .route("/parameters", get(|| async { Json(json!({"N": 2, "M": 3})) }))
            .route(
                "/map",
                get(|| async { (AxumStatus::MULTIPLE_CHOICES, "All tasks are distributed for map\n") })
                    .post(|| async { Json(json!({"ok": true})) }),
            )
            .route(
                "/reduce",
                get(|| async { (AxumStatus::SEE_OTHER, "Map tasks are not yet completed\n") }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn mapea_codigos_de_estado_a_poll_outcome() {
        let client = CoordinatorClient::new(&stub_coordinator().await).unwrap();

        assert_eq!(
            client.parameters().await.unwrap(),
            JobParameters {
                map_tasks: 2,
                reduce_tasks: 3
            }
        );
        assert_eq!(client.poll(Phase::Map).await.unwrap(), PollOutcome::Exhausted);
        assert_eq!(
            client.poll(Phase::Reduce).await.unwrap(),
            PollOutcome::PhaseNotReady
        );
        client.report_complete(Phase::Map, 0).await.unwrap();
    }

    #[tokio::test]
    async fn endpoint_desconocido_es_error() {
        let client = CoordinatorClient::new(&stub_coordinator().await).unwrap();

        // el stub no tiene POST /reduce
        let err = client.report_complete(Phase::Reduce, 0).await.unwrap_err();
        assert!(matches!(err, WorkerError::UnexpectedStatus { method: "POST", .. }));
    }

    #[tokio::test]
    async fn ruta_fuera_del_protocolo_devuelve_el_status_del_coordinator() {
        let client = CoordinatorClient::new(&stub_coordinator().await).unwrap();

        assert_eq!(client.get_status("jobs").await.unwrap(), StatusCode::NOT_FOUND);
        assert_eq!(client.get_status("/parameters").await.unwrap(), StatusCode::OK);
    }

    #[test]
    fn base_url_sin_barra_final() {
        let client = CoordinatorClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
