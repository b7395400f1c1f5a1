pub mod user_repo;
pub use user_repo::UserRepository;
pub mod access_key_repo;
pub use access_key_repo::AccessKeyRepository;
pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenancyRepository;
pub mod booking_repo;
pub use booking_repo::BookingRepository;
