pub mod auth_service;
pub use auth_service::AuthService;
pub mod raffle_service;
pub use raffle_service::RaffleService;
pub mod sale_service;
pub use sale_service::SaleService;
pub mod partner_service;
pub use partner_service::PartnerService;
pub mod payment_service;
pub use payment_service::PaymentGateway;
pub mod receipt_service;
pub use receipt_service::ReceiptService;
pub mod report_service;
pub use report_service::ReportService;
