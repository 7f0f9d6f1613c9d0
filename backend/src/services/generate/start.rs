//! `POST /api/generate/start`
//!
//! Registers a `Pending` job, answers with its `job_id` straight away and runs
//! the generation on a blocking worker. Progress callbacks become `JobUpdate`s
//! on the job controller's channel; the final outcome (or the precondition
//! failure) is sent last on the same channel, so it can never be overwritten
//! by a late progress message.

use crate::config::Config;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::services::generate::{generate_invoices, GenerationRequest};
use crate::services::templates::pdf::PdfExporter;
use crate::services::templates::TemplateSource;
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::requests::StartGenerationRequest;
use log::info;
use std::path::PathBuf;
use uuid::Uuid;

pub(crate) async fn process(
    state: web::Data<JobsState>,
    config: web::Data<Config>,
    payload: web::Json<StartGenerationRequest>,
) -> impl Responder {
    let request = to_generation_request(payload.into_inner(), &config);
    let job_id = schedule_generation_job(&state, config.get_ref().clone(), request).await;
    HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id }))
}

fn to_generation_request(req: StartGenerationRequest, config: &Config) -> GenerationRequest {
    let template = match req.custom_template.filter(|p| !p.trim().is_empty()) {
        Some(path) => TemplateSource::Custom(PathBuf::from(path)),
        None => TemplateSource::Builtin(req.template),
    };
    let output_dir = req
        .output_dir
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| config.output_dir.clone());

    GenerationRequest {
        csv_path: PathBuf::from(req.csv_path),
        seller_name: req.name,
        seller_address: req.address,
        seller_ico: req.ico,
        output_dir,
        template,
    }
}

async fn schedule_generation_job(
    state: &JobsState,
    config: Config,
    request: GenerationRequest,
) -> String {
    let job_id = Uuid::new_v4().to_string();
    state
        .jobs
        .write()
        .await
        .insert(job_id.clone(), JobStatus::Pending);

    let tx = state.tx.clone();
    let id = job_id.clone();
    info!("Scheduled generation job {} for {}", id, request.csv_path.display());

    tokio::spawn(async move {
        let progress_tx = tx.clone();
        let progress_id = id.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let exporter = PdfExporter::from_config(&config);
            generate_invoices(
                &request,
                &config.templates_dir,
                &exporter,
                |completed, total, current| {
                    let _ = progress_tx.blocking_send(JobUpdate {
                        job_id: progress_id.clone(),
                        status: JobStatus::InProgress {
                            completed,
                            total,
                            current: current.to_string(),
                        },
                    });
                },
            )
        });

        let status = match handle.await {
            Ok(Ok(outcome)) => JobStatus::Completed(outcome),
            Ok(Err(e)) => JobStatus::Failed(e.to_string()),
            Err(e) => JobStatus::Failed(format!("Task join error: {}", e)),
        };
        let _ = tx.send(JobUpdate { job_id: id, status }).await;
    });

    job_id
}
