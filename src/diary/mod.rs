mod dto;
pub mod handlers;
pub mod model;
pub mod service;

use axum::{routing::post, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/addmeal", post(handlers::add_meal))
        .route("/getmeals", post(handlers::get_meals))
        .route("/addmealtoday", post(handlers::add_meal_today))
        .route("/deletemeal", post(handlers::delete_meal))
        .route("/addfood", post(handlers::add_food))
        .route("/getfoodentries", post(handlers::get_food_entries))
        .route("/deletefoodentry", post(handlers::delete_food_entry))
}
