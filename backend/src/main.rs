mod batch;
mod config;
mod job_controller;
mod mutation;
mod services;

use crate::batch::orchestrator::BatchOrchestrator;
use crate::config::Config;
use crate::job_controller::state::JobsState;
use crate::mutation::http::CertificateApi;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use tokio::sync::mpsc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Config::from_env();

    // Initialize the job registry and the channel feeding it.
    let (tx, rx) = mpsc::channel(100);
    let jobs_state = JobsState::new(tx);

    // Start the job updater task.
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    let orchestrator = web::Data::new(BatchOrchestrator::new(config.pacing));
    let api = web::Data::new(CertificateApi::new(
        config.certificate_api_base.clone(),
        config.mutation_timeout,
    ));

    info!("Server running at http://{}:{}", config.host, config.port);

    let bind = (config.host.clone(), config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(1024 * 1024)) // 1 MB
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(orchestrator.clone())
            .app_data(api.clone())
            .service(services::certificates::configure_routes())
    })
    .bind(bind)?
    .run()
    .await
}
