//! Bulk certificate operations over a selection of order line items.
//!
//! The downstream certificate service only offers single-item endpoints, so
//! a bulk request is executed here as a background batch job: one mutation
//! per selected line item, sequential and paced, with partial failure
//! reported in the terminal summary rather than aborting the run.
//!
//! The provided routes are:
//! - `POST /api/certificates/batch/start`: Validates the selection and the
//!   caller's explicit confirmation, then schedules the batch and
//!   immediately returns a `job_id`. Responds `400 Bad Request` when the
//!   selection is empty or unconfirmed, and `409 Conflict` while another
//!   batch is still running.
//!
//! - `GET /api/certificates/batch/status/{job_id}`: Lets clients poll a
//!   running or finished job. Returns the current `JobStatus` (`Pending`,
//!   `InProgress` with a progress snapshot, `Completed` with the summary,
//!   or `Failed`) from the shared `JobsState`.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod get_status;
mod start;

const API_PATH: &str = "/api/certificates/batch";

/// Configures and returns the Actix scope for the batch operation routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        // Route to start a new bulk certificate operation.
        .route("/start", post().to(start::process))
        // Route to get the status of a scheduled batch job.
        .route("/status/{job_id}", get().to(get_status::process))
}
