use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use tripvana_api::db;
use tripvana_api::middleware;
use tripvana_api::routes;
use tripvana_api::services::chat_gateway::ChatGateway;
use tripvana_api::services::orchestrator::Orchestrator;
use tripvana_api::services::session_store::SessionStore;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let gateway = ChatGateway::from_env().expect("LLM_API_KEY must be set");
    let store = Arc::new(SessionStore::new());
    let orchestrator = Orchestrator::new(store.clone(), gateway.clone(), client.clone());

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/health", web::get().to(routes::health::health_check))
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(orchestrator.clone()))
            .service(
                web::scope("/api")
                    .route("/chat", web::post().to(routes::chat::completions))
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(routes::account::signup))
                            .route("/signin", web::post().to(routes::account::signin))
                            .service(
                                web::scope("").wrap(middleware::auth::AuthMiddleware).route(
                                    "/session",
                                    web::get().to(routes::account::user_session),
                                ),
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
    })
    .bind((host, port))?
    .run()
    .await
}
