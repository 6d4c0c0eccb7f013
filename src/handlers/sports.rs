use actix_web::HttpResponse;

use crate::models::sport;

/// GET /api/sports
/// The selectable competitions with their team-size bounds.
pub async fn list() -> HttpResponse {
    HttpResponse::Ok().json(sport::catalog())
}
