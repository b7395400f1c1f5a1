// tests/common/mod.rs
//
// Suporte aos testes de integração. Eles rodam contra um Postgres real
// quando DATABASE_URL está definida e são pulados (sem falhar) quando
// não está. Cada teste cria seus próprios dados com sufixos únicos,
// então a suíte pode rodar em paralelo e repetidas vezes no mesmo banco.

use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use barbershop_backend::config::AppState;

pub async fn test_state() -> Option<AppState> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL não definida; pulando teste de integração");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(16)
        .connect(&url)
        .await
        .expect("falha ao conectar no banco de testes");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("falha ao rodar as migrações no banco de testes");

    Some(AppState::from_pool(pool, "segredo-de-teste".into()))
}

pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

pub fn unique_email() -> String {
    format!("{}@teste.local", unique("conta"))
}

/// Conta criada direto no repositório (sem passar pelo registro):
/// útil quando o teste só precisa de um customer_id válido.
pub async fn create_account(pool: &PgPool) -> Uuid {
    use barbershop_backend::db::UserRepository;

    let repo = UserRepository::new(pool.clone());
    let user = repo
        .create_user(pool, &unique_email(), "hash-de-teste")
        .await
        .expect("falha ao criar conta de teste");

    user.id
}

use barbershop_backend::models::{
    profile::{Profile, UserRole},
    tenancy::{Capster, CapsterStatus},
};
use chrono::Utc;

// Perfis em memória para os serviços que recebem o ator por referência.

pub fn admin_profile() -> Profile {
    profile_with_role(UserRole::Admin, Uuid::new_v4())
}

pub fn customer_profile(account_id: Uuid) -> Profile {
    profile_with_role(UserRole::Customer, account_id)
}

pub fn staff_profile(account_id: Uuid) -> Profile {
    profile_with_role(UserRole::Staff, account_id)
}

fn profile_with_role(role: UserRole, account_id: Uuid) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        account_id,
        role,
        branch_id: None,
        full_name: "Perfil de Teste".into(),
        phone: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Capster pronto para receber agendamentos: criado, aprovado e com a
/// disponibilidade ligada.
pub async fn bookable_capster(
    state: &AppState,
    branch_id: Uuid,
    service_ids: Option<Vec<Uuid>>,
) -> Capster {
    let capster = state
        .tenancy_service
        .create_capster(&unique("Capster"), Some(branch_id), None, service_ids)
        .await
        .expect("falha ao criar capster");

    state
        .tenancy_service
        .set_capster_status(capster.id, CapsterStatus::Approved)
        .await
        .expect("falha ao aprovar capster");

    state
        .tenancy_service
        .set_capster_availability(capster.id, true, &admin_profile())
        .await
        .expect("falha ao ligar disponibilidade")
}
