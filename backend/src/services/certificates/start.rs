//! # Batch Start Service
//!
//! This module provides the `POST /api/certificates/batch/start` endpoint,
//! which applies one certificate mutation (generate, regenerate or delete)
//! to every selected order line item as a background batch job.
//!
//! ## Workflow:
//!
//! 1.  **HTTP Request**: The `process` handler receives a
//!     `StartBatchRequest` naming the batch kind, the selected item keys
//!     and the caller's explicit confirmation.
//!
//! 2.  **Pre-flight**: `schedule_batch_job` collapses duplicate keys
//!     through a `SelectionSet`, arms the confirmation gate (rejecting an
//!     empty selection), and refuses to continue without the confirmation
//!     flag. It then claims the orchestrator's single-run slot, so a
//!     competing submission is turned away with `Busy` before any job id
//!     exists.
//!
//! 3.  **Job Scheduling**: A fresh `job_id` is registered as `Pending` in
//!     the shared `JobsState` and returned to the client immediately for
//!     status polling. A Tokio task then drives the run to completion.
//!
//! 4.  **Progress Reporting**: The run emits a progress snapshot before
//!     each item is dispatched. A per-job bridge task forwards those
//!     snapshots to the central job updater as `InProgress` states, and the
//!     terminal summary is published as `Completed` once the last item has
//!     been attempted.
//!
//! A failed item never aborts the run; its reason is recorded in the job's
//! outcomes and logged here once the batch is over. Succeeded items are
//! never rolled back, so a partial failure leaves the batch partially
//! applied — exactly what the summary counts report.

use crate::batch::gate::{ConfirmationGate, GateError};
use crate::batch::orchestrator::{BatchError, BatchOrchestrator};
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::mutation::http::CertificateApi;
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::model::batch::{BatchKind, ItemOutcome, ProgressSnapshot};
use common::model::item::ItemKey;
use common::model::selection::SelectionSet;
use common::requests::StartBatchRequest;
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Why a submission was turned away before a job was created.
#[derive(Debug, Error)]
enum ScheduleError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error("the batch operation was not confirmed")]
    NotConfirmed,
}

/// The Actix web handler for `POST /api/certificates/batch/start`.
///
/// Schedules the batch and immediately returns its `job_id`; the client
/// polls `GET /api/certificates/batch/status/{job_id}` until the job is
/// terminal. A second submission while a batch is running gets
/// `409 Conflict`; an empty or unconfirmed one gets `400 Bad Request`.
pub(crate) async fn process(
    state: web::Data<JobsState>,
    orchestrator: web::Data<BatchOrchestrator>,
    api: web::Data<CertificateApi>,
    payload: web::Json<StartBatchRequest>,
) -> impl Responder {
    match schedule_batch_job(state, orchestrator, api, payload.into_inner()).await {
        Ok(job_id) => HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id })),
        Err(err @ ScheduleError::Batch(BatchError::Busy)) => {
            HttpResponse::Conflict().body(err.to_string())
        }
        Err(err) => HttpResponse::BadRequest().body(err.to_string()),
    }
}

/// Validates the submission, claims the orchestrator, and spawns the run.
///
/// # Returns
/// The new `job_id` on success, or the `ScheduleError` explaining why no
/// job was created.
async fn schedule_batch_job(
    state: web::Data<JobsState>,
    orchestrator: web::Data<BatchOrchestrator>,
    api: web::Data<CertificateApi>,
    req: StartBatchRequest,
) -> Result<String, ScheduleError> {
    // Collapse duplicate keys; the run must attempt each record once.
    let mut selection = SelectionSet::new();
    for key in req.items {
        if !selection.contains(&key) {
            selection.toggle(key);
        }
    }

    // Pre-flight gate: a non-empty selection, then the explicit confirm step.
    let mut gate = ConfirmationGate::new();
    gate.arm(req.kind, selection.snapshot())?;
    if !req.confirmed {
        gate.dismiss();
        return Err(ScheduleError::NotConfirmed);
    }
    let (kind, items) = gate.confirm()?;

    // Claim the single-run slot before the job id exists, so a competing
    // submission is rejected without leaving a phantom job behind.
    let run = orchestrator.begin(kind, items)?;

    let job_id = Uuid::new_v4().to_string();
    state.register(&job_id).await;
    info!(
        "scheduled {} batch job {} ({} items)",
        kind,
        job_id,
        run.total()
    );

    let tx = state.tx.clone(); // Channel to the central job updater.
    let job_id_clone = job_id.clone();
    let api = api.into_inner();

    tokio::spawn(async move {
        // Bridge this job's progress snapshots into the central updater.
        let (progress_tx, mut progress_rx) = mpsc::channel::<ProgressSnapshot>(100);
        let updater_tx = tx.clone();
        let job_id_for_updater = job_id_clone.clone();
        let bridge = tokio::spawn(async move {
            while let Some(snapshot) = progress_rx.recv().await {
                let _ = updater_tx
                    .send(JobUpdate {
                        job_id: job_id_for_updater.clone(),
                        status: JobStatus::InProgress(snapshot),
                    })
                    .await;
            }
        });

        let mutate = {
            let api = Arc::clone(&api);
            move |key: ItemKey| {
                let api = Arc::clone(&api);
                async move {
                    match kind {
                        BatchKind::Generate | BatchKind::Regenerate => api.generate(&key).await,
                        BatchKind::Delete => api.delete(&key).await,
                    }
                }
            }
        };

        let job = run
            .execute(mutate, move |snapshot| {
                // Progress is observational; drop it under backpressure
                // rather than stalling the run.
                let _ = progress_tx.try_send(snapshot);
            })
            .await;

        // The progress sender is gone once execute returns; wait for the
        // bridge to drain so no stale InProgress lands after the summary.
        let _ = bridge.await;

        for record in &job.outcomes {
            if let ItemOutcome::Failed(reason) = &record.outcome {
                warn!(
                    "batch job {}: item {} failed: {}",
                    job_id_clone, record.key, reason
                );
            }
        }

        let summary = job.summary();
        info!(
            "batch job {} finished: {} succeeded, {} failed of {}",
            job_id_clone, summary.succeeded, summary.failed, summary.total
        );
        let _ = tx
            .send(JobUpdate {
                job_id: job_id_clone,
                status: JobStatus::Completed(summary),
            })
            .await;
    });

    Ok(job_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_controller::state::start_job_updater;
    use common::model::batch::BatchSummary;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_env(pacing: Duration) -> (JobsState, mpsc::Receiver<JobUpdate>, web::Data<BatchOrchestrator>) {
        let (tx, rx) = mpsc::channel(100);
        let state = JobsState::new(tx);
        let orchestrator = web::Data::new(BatchOrchestrator::new(pacing));
        (state, rx, orchestrator)
    }

    fn api_for(uri: &str) -> web::Data<CertificateApi> {
        web::Data::new(CertificateApi::new(
            uri.to_string(),
            Duration::from_secs(1),
        ))
    }

    fn request(kind: BatchKind, items: Vec<ItemKey>, confirmed: bool) -> StartBatchRequest {
        StartBatchRequest {
            kind,
            items,
            confirmed,
        }
    }

    async fn wait_for_summary(state: &JobsState, job_id: &str) -> BatchSummary {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(JobStatus::Completed(summary)) = state.get(job_id).await {
                    return summary;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("job did not complete in time")
    }

    #[tokio::test]
    async fn unconfirmed_submission_creates_no_job() {
        let (state, _rx, orchestrator) = test_env(Duration::ZERO);
        let api = api_for("http://127.0.0.1:9");

        let err = schedule_batch_job(
            web::Data::new(state.clone()),
            orchestrator,
            api,
            request(
                BatchKind::Delete,
                vec![ItemKey::new("ord-1", "li-1")],
                false,
            ),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ScheduleError::NotConfirmed));
        assert!(state.jobs.read().await.is_empty());
    }

    #[tokio::test]
    async fn empty_selection_is_rejected_at_the_gate() {
        let (state, _rx, orchestrator) = test_env(Duration::ZERO);
        let api = api_for("http://127.0.0.1:9");

        let err = schedule_batch_job(
            web::Data::new(state.clone()),
            orchestrator,
            api,
            request(BatchKind::Generate, Vec::new(), true),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ScheduleError::Gate(GateError::EmptySelection)
        ));
        assert!(state.jobs.read().await.is_empty());
    }

    #[tokio::test]
    async fn completed_job_reports_partial_failure_and_dedupes_keys() {
        let server = MockServer::start().await;
        for (line_item, status) in [("li-1", 200u16), ("li-2", 500), ("li-3", 200)] {
            Mock::given(method("POST"))
                .and(path("/certificate/generate"))
                .and(body_json(serde_json::json!({ "lineItemId": line_item })))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;
        }

        let (state, rx, orchestrator) = test_env(Duration::ZERO);
        tokio::spawn(start_job_updater(state.clone(), rx));

        // li-1 appears twice; the snapshot must attempt it once.
        let items = vec![
            ItemKey::new("ord-1", "li-1"),
            ItemKey::new("ord-1", "li-2"),
            ItemKey::new("ord-1", "li-1"),
            ItemKey::new("ord-1", "li-3"),
        ];
        let job_id = schedule_batch_job(
            web::Data::new(state.clone()),
            orchestrator,
            api_for(&server.uri()),
            request(BatchKind::Generate, items, true),
        )
        .await
        .unwrap();

        let summary = wait_for_summary(&state, &job_id).await;
        assert_eq!(
            summary,
            BatchSummary {
                succeeded: 2,
                failed: 1,
                total: 3
            }
        );
    }

    #[tokio::test]
    async fn concurrent_submission_is_rejected_as_busy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/certificate/delete"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(250)))
            .mount(&server)
            .await;

        let (state, rx, orchestrator) = test_env(Duration::ZERO);
        tokio::spawn(start_job_updater(state.clone(), rx));
        let api = api_for(&server.uri());

        let first = schedule_batch_job(
            web::Data::new(state.clone()),
            orchestrator.clone(),
            api.clone(),
            request(
                BatchKind::Delete,
                vec![ItemKey::new("ord-1", "li-1"), ItemKey::new("ord-1", "li-2")],
                true,
            ),
        )
        .await
        .unwrap();

        // The first run holds the slot until its delayed calls finish.
        let err = schedule_batch_job(
            web::Data::new(state.clone()),
            orchestrator,
            api,
            request(
                BatchKind::Delete,
                vec![ItemKey::new("ord-2", "li-9")],
                true,
            ),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScheduleError::Batch(BatchError::Busy)));

        // The rejected attempt did not disturb the first job.
        let summary = wait_for_summary(&state, &first).await;
        assert_eq!(
            summary,
            BatchSummary {
                succeeded: 2,
                failed: 0,
                total: 2
            }
        );
    }
}
