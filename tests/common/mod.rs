use actix_web::{web, App};
use std::sync::Arc;

use tripvana_api::middleware;
use tripvana_api::routes;
use tripvana_api::services::chat_gateway::ChatGateway;
use tripvana_api::services::orchestrator::Orchestrator;
use tripvana_api::services::session_store::SessionStore;

pub const SESSION_HEADER: &str = "X-Session-Id";

pub struct TestApp {
    pub store: Arc<SessionStore>,
    pub client: Arc<mongodb::Client>,
}

impl TestApp {
    pub async fn new() -> Self {
        // The gateway only needs the credential to construct; no test here
        // performs a model round trip.
        if std::env::var("LLM_API_KEY").is_err() {
            std::env::set_var("LLM_API_KEY", "sk-test-not-a-real-key");
        }

        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        // Lazy client: nothing connects until a collection is touched, and
        // these tests never touch one.
        let client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("failed to build MongoDB client");

        Self {
            store: Arc::new(SessionStore::new()),
            client: Arc::new(client),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let gateway = ChatGateway::from_env().expect("LLM_API_KEY must be set for tests");
        let orchestrator =
            Orchestrator::new(self.store.clone(), gateway.clone(), self.client.clone());

        App::new()
            .app_data(web::Data::new(self.client.clone()))
            .app_data(web::Data::new(self.store.clone()))
            .app_data(web::Data::new(gateway))
            .app_data(web::Data::new(orchestrator))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth").service(
                            web::scope("")
                                .wrap(middleware::auth::AuthMiddleware)
                                .route("/session", web::get().to(routes::account::user_session)),
                        ),
                    )
                    .service(
                        web::scope("/trip")
                            .route("", web::get().to(routes::trip::get_trip))
                            .route("", web::patch().to(routes::trip::update_trip))
                            .route("", web::delete().to(routes::trip::clear_trip))
                            .route("/steps/{step}", web::get().to(routes::trip::validate_step))
                            .route("/selections", web::put().to(routes::trip::set_selections)),
                    )
                    .route(
                        "/recommendations/{kind}",
                        web::post().to(routes::recommendation::fetch),
                    )
                    .service(
                        web::scope("/packing-lists")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route("", web::get().to(routes::packing::get_packing_list))
                            .route("/items", web::put().to(routes::packing::toggle_item)),
                    )
                    .service(
                        web::scope("/itineraries")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route("/save", web::post().to(routes::saved_itinerary::save))
                            .route("/saved", web::get().to(routes::saved_itinerary::list))
                            .route(
                                "/saved/{id}",
                                web::get().to(routes::saved_itinerary::get_by_id),
                            ),
                    ),
            )
    }
}
