//! A small pet store documenting itself with swaggen.

pub mod handlers;
pub mod models;
pub mod services;

use axum::Router;
use swaggen::prelude::*;

use crate::models::{ApiError, NewPet, Pet};
use crate::services::PetService;

/// Annotations for every handler the store routes.
pub fn route_specs() -> RouteSpecTable {
    let mut specs = RouteSpecTable::new();
    specs
        .handler("list_pets")
        .summary("List pets")
        .produces(Field::list_of(Field::model::<Pet>()));
    specs
        .handler("get_pet")
        .summary("Find a pet by id")
        .produces(Field::model::<Pet>())
        .response_example(404, "Pet not found", ResponseExample::model::<ApiError>());
    specs
        .handler("create_pet")
        .summary("Add a pet")
        .consumes(Field::model::<NewPet>().named("pet"), ParamLocation::Body, true)
        .response(201, "Created")
        .security("appToken", Vec::<String>::new());
    specs
        .handler("delete_pet")
        .summary("Remove a pet")
        .response(204, "Removed")
        .response_example(404, "Pet not found", ResponseExample::model::<ApiError>())
        .security("appToken", Vec::<String>::new());
    specs.handler("health").exclude(true);
    specs
}

pub fn router() -> DocumentedRouter<PetService> {
    DocumentedRouter::new()
        .group("pets", "/pets", |r| {
            r.get("list_pets", "", handlers::list_pets)
                .post("create_pet", "", handlers::create_pet)
                .get("get_pet", "/<pet_id:int>", handlers::get_pet)
                .delete("delete_pet", "/<pet_id:int>", handlers::delete_pet)
        })
        .get("health", "/health", handlers::health)
}

/// The store with its documentation mounted.
///
/// # Errors
///
/// The [`DocError`] that stopped the document build.
pub fn app(config: DocConfig) -> Result<Router, DocError> {
    let router = ApiDocs::new(config, route_specs()).install(router())?;
    Ok(router.with_state(PetService::new()))
}
