//! Route definitions for the harvest tracker API

use axum::{
    middleware,
    routing::{get, post, put, MethodRouter},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Catalog and pantries: public reads, admin writes
        .nest("/categories", category_routes(&state))
        .nest("/produce-types", produce_type_routes(&state))
        .nest("/food-pantries", pantry_routes(&state))
        // Protected routes
        .nest("/harvests", harvest_routes(&state))
        .nest("/dashboard", dashboard_routes(&state))
        .nest("/reports", report_routes(&state))
        .nest("/admin", admin_routes(&state))
}

/// Require a valid bearer token on a method router
fn protected(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

fn category_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).merge(protected(state, post(handlers::create_category))),
        )
        .route(
            "/:category_id",
            get(handlers::get_category).merge(protected(
                state,
                put(handlers::update_category).delete(handlers::delete_category),
            )),
        )
}

fn produce_type_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_produce_types)
                .merge(protected(state, post(handlers::create_produce_type))),
        )
        .route(
            "/:produce_type_id",
            get(handlers::get_produce_type).merge(protected(
                state,
                put(handlers::update_produce_type).delete(handlers::delete_produce_type),
            )),
        )
}

fn pantry_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_food_pantries)
                .merge(protected(state, post(handlers::create_food_pantry))),
        )
        .route(
            "/:pantry_id",
            get(handlers::get_food_pantry).merge(protected(
                state,
                put(handlers::update_food_pantry).delete(handlers::delete_food_pantry),
            )),
        )
}

/// Harvest management routes (protected)
fn harvest_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_harvests).post(handlers::record_harvest))
        .route(
            "/:harvest_id",
            get(handlers::get_harvest)
                .put(handlers::update_harvest)
                .delete(handlers::delete_harvest),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Dashboard routes (protected)
fn dashboard_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/pantry-progress", get(handlers::get_pantry_progress))
        .route("/charts", get(handlers::get_charts))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Report export routes (protected)
fn report_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/export", get(handlers::export_report))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Administration routes (protected, admin role checked by the handlers)
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/seed", post(handlers::seed_database))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}
