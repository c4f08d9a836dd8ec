pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod raffle_repo;
pub use raffle_repo::RaffleRepository;
pub mod sale_repo;
pub use sale_repo::SaleRepository;
pub mod partner_repo;
pub use partner_repo::PartnerRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
