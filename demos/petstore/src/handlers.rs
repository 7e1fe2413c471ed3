use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::models::{ApiError, NewPet, Pet};
use crate::services::PetService;

pub async fn list_pets(State(pets): State<PetService>) -> Json<Vec<Pet>> {
    Json(pets.list().await)
}

pub async fn get_pet(
    State(pets): State<PetService>,
    Path(id): Path<i64>,
) -> Result<Json<Pet>, (StatusCode, Json<ApiError>)> {
    pets.get_by_id(id).await.map(Json).ok_or_else(|| not_found(id))
}

pub async fn create_pet(
    State(pets): State<PetService>,
    Json(body): Json<NewPet>,
) -> (StatusCode, Json<Pet>) {
    (StatusCode::CREATED, Json(pets.create(body).await))
}

pub async fn delete_pet(
    State(pets): State<PetService>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    if pets.delete(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

pub async fn health() -> &'static str {
    "OK"
}

fn not_found(id: i64) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(format!("no pet with id {id}"))),
    )
}
