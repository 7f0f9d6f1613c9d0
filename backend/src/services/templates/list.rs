use actix_web::{HttpResponse, Responder};
use common::model::template::TemplateLanguage;
use serde_json::json;

/// Actix handler for `GET /api/templates`.
pub(crate) async fn process() -> impl Responder {
    let templates: Vec<_> = TemplateLanguage::ALL
        .iter()
        .map(|language| {
            json!({
                "id": language,
                "label": language.label(),
                "file": language.file_name(),
            })
        })
        .collect();
    HttpResponse::Ok().json(templates)
}
