// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        PartnerRepository, ProfileRepository, RaffleRepository, ReportRepository, SaleRepository,
    },
    services::{
        payment_service::PixCheckoutClient, receipt_service::ReceiptConfig, AuthService,
        PartnerService, PaymentGateway, RaffleService, ReceiptService, ReportService, SaleService,
    },
};

// URLs de retorno do checkout hospedado.
#[derive(Clone)]
pub struct CheckoutConfig {
    pub success_url: String,
    pub cancel_url: String,
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub raffle_service: RaffleService,
    pub sale_service: SaleService,
    pub partner_service: PartnerService,
    pub receipt_service: ReceiptService,
    pub report_service: ReportService,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub checkout: CheckoutConfig,
}

impl AppState {
    // Carrega as configurações do ambiente e monta o grafo de dependências.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        let payment_api_url =
            env::var("PAYMENT_API_URL").expect("PAYMENT_API_URL deve ser definida");
        let payment_api_key =
            env::var("PAYMENT_API_KEY").expect("PAYMENT_API_KEY deve ser definida");

        let checkout = CheckoutConfig {
            success_url: env::var("CHECKOUT_SUCCESS_URL")
                .unwrap_or_else(|_| "http://localhost:5173/obrigado".to_string()),
            cancel_url: env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|_| "http://localhost:5173/".to_string()),
        };

        let receipt_config = ReceiptConfig {
            platform_name: env::var("PLATFORM_NAME")
                .unwrap_or_else(|_| "RIFA PREMIADA".to_string()),
            pix_key: env::var("PLATFORM_PIX_KEY").ok(),
        };

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o grafo de dependências ---
        let profile_repo = ProfileRepository::new(db_pool.clone());
        let raffle_repo = RaffleRepository::new(db_pool.clone());
        let sale_repo = SaleRepository::new(db_pool.clone());
        let partner_repo = PartnerRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());

        let auth_service =
            AuthService::new(profile_repo.clone(), jwt_secret.clone(), db_pool.clone());
        let raffle_service = RaffleService::new(raffle_repo.clone(), db_pool.clone());
        let sale_service = SaleService::new(
            sale_repo.clone(),
            raffle_repo.clone(),
            profile_repo.clone(),
            partner_repo.clone(),
            raffle_service.clone(),
            db_pool.clone(),
        );
        let partner_service = PartnerService::new(
            profile_repo,
            partner_repo,
            sale_repo.clone(),
            db_pool.clone(),
        );
        let receipt_service =
            ReceiptService::new(sale_repo, raffle_repo, receipt_config, db_pool.clone());
        let report_service = ReportService::new(report_repo, db_pool.clone());

        let payment_gateway: Arc<dyn PaymentGateway> =
            Arc::new(PixCheckoutClient::new(payment_api_url, payment_api_key));

        Ok(Self {
            db_pool,
            jwt_secret,
            auth_service,
            raffle_service,
            sale_service,
            partner_service,
            receipt_service,
            report_service,
            payment_gateway,
            checkout,
        })
    }
}
