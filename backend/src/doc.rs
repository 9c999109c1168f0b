//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint in the inbound layer, the
//! request and response schemas they use, and the bearer token security
//! scheme. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` exports it for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, RideStatus, Role};
use crate::inbound::http::{accounts, health, messages, ratings, rides};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /signup or POST /login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Carpool backend API",
        description = "Carpool accounts, rides, ratings and ride messaging behind bearer tokens."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        accounts::signup,
        accounts::login,
        accounts::get_profile,
        accounts::update_profile,
        rides::create_ride,
        rides::list_rides,
        rides::get_ride,
        rides::update_ride_status,
        rides::join_ride,
        rides::list_ride_messages,
        ratings::submit_rating,
        messages::send_message,
        messages::mark_message_read,
        health::ready,
        health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        RideStatus,
        accounts::UserResponse,
        rides::RideResponse,
        ratings::RatingResponse,
        messages::MessageResponse,
    )),
    tags(
        (name = "accounts", description = "Signup, login and the caller's profile"),
        (name = "rides", description = "Ride creation, matching and lifecycle"),
        (name = "ratings", description = "Post-ride ratings"),
        (name = "messages", description = "Messages between ride participants"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "trace_id")]
    #[case("UserResponse", "user_type")]
    #[case("RideResponse", "seats_available")]
    #[case("RatingResponse", "rating")]
    #[case("MessageResponse", "is_read")]
    fn schemas_expose_wire_fields(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas.get(schema).expect("schema registered");

        assert_object_schema_has_field(found, field);
    }

    #[rstest]
    #[case("/signup")]
    #[case("/login")]
    #[case("/rides/{ride_id}/status")]
    #[case("/rides/{ride_id}/join")]
    #[case("/ratings")]
    #[case("/messages/{message_id}/read")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }
}
