//! HTTP surface
//!
//! Path and JSON updates, value lookups, a storage ping and the HTML
//! listing. Writes go through the [`guards::TrustedCaller`] guard, JSON
//! bodies through [`payload::JsonPayload`].

pub mod guards;
pub mod listing;
pub mod payload;
pub mod responses;
pub mod routes;

use rocket::{Build, Rocket, catchers, routes};

pub use listing::ListingPage;

use crate::state::ServerState;

/// Rocket instance serving every endpoint over `state`
pub fn rocket(state: ServerState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount(
            "/",
            routes![
                routes::update_from_path,
                routes::update_json,
                routes::update_batch,
                routes::value_from_path,
                routes::value_json,
                routes::ping,
                routes::listing,
            ],
        )
        .register(
            "/",
            catchers![
                routes::bad_request,
                routes::not_found,
                routes::unprocessable,
                routes::internal_error,
                routes::default_catcher,
            ],
        )
}
