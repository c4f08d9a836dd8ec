//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas + /me protegida)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route(
            "/me",
            get(handlers::auth::get_me).layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth_guard,
            )),
        );

    // Vitrine pública
    let storefront_routes = Router::new()
        .route("/raffles/active", get(handlers::storefront::get_active_raffle))
        .route("/raffles/{id}", get(handlers::storefront::get_raffle))
        .route(
            "/raffles/{id}/availability",
            get(handlers::storefront::get_availability),
        )
        .route("/clicks", post(handlers::storefront::track_click))
        .route("/checkout", post(handlers::storefront::create_checkout))
        .route(
            "/checkout/{session_id}",
            get(handlers::storefront::verify_checkout),
        )
        .route("/sales/{id}/receipt", get(handlers::storefront::get_receipt));

    // Portal do parceiro: cadastro público, resto atrás do auth_guard
    let partner_routes = Router::new()
        .route("/stats", get(handlers::partner::get_stats))
        .route("/sales", get(handlers::partner::list_sales))
        .route("/clicks", get(handlers::partner::list_clicks))
        .route(
            "/withdrawals",
            post(handlers::partner::create_withdrawal).get(handlers::partner::list_withdrawals),
        )
        .route(
            "/door-to-door-sales",
            post(handlers::partner::create_door_to_door),
        )
        .route(
            "/door-to-door-sales/{id}",
            patch(handlers::partner::patch_door_to_door),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
        .route("/register", post(handlers::partner::register_partner));

    // Back-office (o RequireRole<AdminOnly> em cada handler faz o 403)
    let admin_routes = Router::new()
        .route(
            "/raffles",
            post(handlers::admin::create_raffle).get(handlers::admin::list_raffles),
        )
        .route("/raffles/{id}", patch(handlers::admin::update_raffle))
        .route(
            "/raffles/{id}/status",
            patch(handlers::admin::set_raffle_status),
        )
        .route(
            "/raffles/{id}/availability",
            get(handlers::admin::raffle_availability),
        )
        .route(
            "/raffles/{id}/winning-numbers",
            post(handlers::admin::add_winning_numbers).get(handlers::admin::list_winning_numbers),
        )
        .route("/partners", get(handlers::admin::list_partners))
        .route(
            "/partners/{id}/deactivate",
            patch(handlers::admin::deactivate_partner),
        )
        .route("/withdrawals", get(handlers::admin::list_withdrawals))
        .route("/withdrawals/{id}", patch(handlers::admin::review_withdrawal))
        .route("/reports/summary", get(handlers::admin::report_summary))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", storefront_routes)
        .nest("/api/partner", partner_routes)
        .nest("/api/admin", admin_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
