pub mod register;
pub mod sports;

use actix_web::{HttpResponse, web};

/// Register the API routes on an app or scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/register", web::post().to(register::submit))
            .route("/sports", web::get().to(sports::list)),
    );
    cfg.route("/healthz", web::get().to(|| async { HttpResponse::Ok().body("ok") }));
}
