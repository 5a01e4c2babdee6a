use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{bookings, catalog, health_check, seats};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/showtimes/:id/seats", get(seats::showtime_seats))
        .route("/rooms/:id/layout", get(seats::room_layout))
        .route("/foods", get(catalog::foods))
        .route("/vouchers/:code", get(catalog::voucher))
        .route("/quotes", post(catalog::quote))
        .route("/accounts/:phone/membership", get(catalog::membership))
        .route("/bookings", post(bookings::start))
        .route("/bookings/:id", get(bookings::show).delete(bookings::abandon))
        .route("/bookings/:id/seats", put(bookings::select_seats))
        .route("/bookings/:id/foods", put(bookings::select_foods))
        .route(
            "/bookings/:id/voucher",
            put(bookings::apply_voucher).delete(bookings::clear_voucher),
        )
        .route("/bookings/:id/continue", post(bookings::advance))
        .route("/bookings/:id/back", post(bookings::back))
        .route("/bookings/:id/checkout", post(bookings::checkout))
        .route("/confirmations/:id", get(bookings::confirmation));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
}
