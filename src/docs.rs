// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Storefront ---
        handlers::storefront::get_active_raffle,
        handlers::storefront::get_raffle,
        handlers::storefront::get_availability,
        handlers::storefront::track_click,
        handlers::storefront::create_checkout,
        handlers::storefront::verify_checkout,
        handlers::storefront::get_receipt,

        // --- Partner ---
        handlers::partner::register_partner,
        handlers::partner::get_stats,
        handlers::partner::list_sales,
        handlers::partner::list_clicks,
        handlers::partner::list_withdrawals,
        handlers::partner::create_withdrawal,
        handlers::partner::create_door_to_door,
        handlers::partner::patch_door_to_door,

        // --- Admin ---
        handlers::admin::create_raffle,
        handlers::admin::update_raffle,
        handlers::admin::set_raffle_status,
        handlers::admin::list_raffles,
        handlers::admin::raffle_availability,
        handlers::admin::add_winning_numbers,
        handlers::admin::list_winning_numbers,
        handlers::admin::list_partners,
        handlers::admin::deactivate_partner,
        handlers::admin::list_withdrawals,
        handlers::admin::review_withdrawal,
        handlers::admin::report_summary,
    ),
    components(
        schemas(
            // --- Perfis ---
            models::profile::UserRole,
            models::profile::Profile,
            models::profile::AuthResponse,

            // --- Rifas ---
            models::raffle::RaffleStatus,
            models::raffle::Raffle,
            models::raffle::WinningNumber,
            models::raffle::RaffleAvailability,

            // --- Vendas ---
            models::sale::SaleStatus,
            models::sale::PaymentMethod,
            models::sale::Sale,
            models::sale::PurchasedNumber,
            models::sale::PrizeMatch,
            models::sale::CompletedSale,

            // --- Parceiros ---
            models::partner::PartnerClick,
            models::partner::WithdrawalMethod,
            models::partner::WithdrawalStatus,
            models::partner::Withdrawal,
            models::partner::PartnerStats,

            // --- Pagamento ---
            models::payment::CheckoutSession,
            models::payment::SessionStatus,

            // --- Relatórios ---
            models::report::FinancialSummary,
            models::report::RaffleReportRow,
            models::report::TopPartnerRow,
            models::report::AdminReport,

            // --- Payloads ---
            handlers::auth::RegisterPayload,
            handlers::auth::LoginPayload,
            handlers::storefront::TrackClickPayload,
            handlers::storefront::CreateCheckoutPayload,
            handlers::storefront::CheckoutStatusResponse,
            handlers::partner::RegisterPartnerPayload,
            handlers::partner::CreateWithdrawalPayload,
            handlers::partner::CreateDoorToDoorPayload,
            handlers::partner::DoorToDoorAction,
            handlers::partner::PatchDoorToDoorPayload,
            handlers::admin::CreateRafflePayload,
            handlers::admin::UpdateRafflePayload,
            handlers::admin::SetRaffleStatusPayload,
            handlers::admin::WinningNumberEntry,
            handlers::admin::AddWinningNumbersPayload,
            handlers::admin::ReviewWithdrawalPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Storefront", description = "Vitrine pública: rifa, checkout e comprovante"),
        (name = "Partner", description = "Portal do parceiro: painel, vendas em campo e saques"),
        (name = "Admin", description = "Back-office: rifas, parceiros, saques e relatórios")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
