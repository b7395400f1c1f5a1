// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        AccessKeyRepository, BookingRepository, ProfileRepository, TenancyRepository,
        UserRepository,
    },
    services::{
        access_key_service::AccessKeyService, auth::AuthService,
        availability_service::AvailabilityService, booking_service::BookingService,
        profile_service::ProfileService, tenancy_service::TenancyService,
    },
};

// O estado compartilhado da aplicação: a pool, o segredo do JWT e o
// grafo de serviços, montado uma única vez na subida.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub access_key_service: AccessKeyService,
    pub profile_service: ProfileService,
    pub tenancy_service: TenancyService,
    pub availability_service: AvailabilityService,
    pub booking_service: BookingService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, jwt_secret))
    }

    /// Monta o grafo de dependências a partir de uma pool já aberta.
    /// Os testes de integração usam este construtor direto.
    pub fn from_pool(db_pool: PgPool, jwt_secret: String) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let key_repo = AccessKeyRepository::new(db_pool.clone());
        let profile_repo = ProfileRepository::new(db_pool.clone());
        let tenancy_repo = TenancyRepository::new(db_pool.clone());
        let booking_repo = BookingRepository::new(db_pool.clone());

        let access_key_service = AccessKeyService::new(key_repo.clone(), db_pool.clone());
        let profile_service =
            ProfileService::new(profile_repo, tenancy_repo.clone(), db_pool.clone());
        let tenancy_service = TenancyService::new(tenancy_repo.clone(), db_pool.clone());
        let availability_service =
            AvailabilityService::new(tenancy_repo.clone(), db_pool.clone());
        let booking_service =
            BookingService::new(booking_repo, tenancy_repo, db_pool.clone());
        let auth_service = AuthService::new(
            user_repo,
            key_repo,
            profile_service.clone(),
            jwt_secret.clone(),
            db_pool.clone(),
        );

        Self {
            db_pool,
            jwt_secret,
            auth_service,
            access_key_service,
            profile_service,
            tenancy_service,
            availability_service,
            booking_service,
        }
    }
}
