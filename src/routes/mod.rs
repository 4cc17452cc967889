use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{drivers, fares, reservations, vehicles};
use crate::middleware::rate_limit::create_public_governor;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes used by the booking wizard (rate limited per IP)
    let public_routes = Router::new()
        .route("/fares/quote", post(fares::quote))
        .route("/reservations", post(reservations::create_reservation))
        .layer(create_public_governor());

    Router::new()
        .nest("/api", public_routes)
        .nest("/api/admin", admin_routes())
        .with_state(state)
}

/// Staff routes. Access control is handled in front of this service.
fn admin_routes() -> Router<AppState> {
    Router::new()
        // Pricing
        .route("/pricing-tables/validate", post(fares::validate_table))
        // Fleet
        .route(
            "/vehicles",
            get(vehicles::list_vehicles).post(vehicles::create_vehicle),
        )
        .route(
            "/vehicles/{id}",
            put(vehicles::update_vehicle).delete(vehicles::delete_vehicle),
        )
        // Driver directory
        .route(
            "/drivers",
            get(drivers::list_drivers).post(drivers::create_driver),
        )
        .route("/drivers/{id}/active", put(drivers::set_driver_active))
        // Reservations
        .route("/reservations", get(reservations::list_reservations))
        .route(
            "/reservations/{id}",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        )
        .route("/reservations/{id}/assign", post(reservations::assign_reservation))
        .route("/reservations/{id}/confirm", post(reservations::confirm_reservation))
        .route("/reservations/{id}/start", post(reservations::start_reservation))
        .route("/reservations/{id}/complete", post(reservations::complete_reservation))
        .route("/reservations/{id}/cancel", post(reservations::cancel_reservation))
}
