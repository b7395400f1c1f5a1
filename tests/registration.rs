// tests/registration.rs
//
// O fluxo de registro gateado por chave: conta + perfil + consumo da
// chave numa transação só, e o invariante de um-perfil-por-conta.

mod common;

use barbershop_backend::{
    common::error::AppError,
    db::UserRepository,
    models::{
        access_key::{CreateKeyPayload, InvalidKeyReason},
        auth::RegisterUserPayload,
        profile::UserRole,
    },
};

fn register_payload(role: UserRole, access_key: &str) -> RegisterUserPayload {
    RegisterUserPayload {
        email: common::unique_email(),
        password: "senha-secreta".into(),
        full_name: "Conta de Teste".into(),
        phone: None,
        access_key: access_key.to_string(),
        role,
        branch_id: None,
    }
}

async fn provision_key(
    state: &barbershop_backend::config::AppState,
    role: UserRole,
    max_uses: Option<i32>,
) -> String {
    let key_value = common::unique("CHAVE");
    state
        .access_key_service
        .create_key(CreateKeyPayload {
            name: common::unique("chave de registro"),
            key_value: Some(key_value.clone()),
            role,
            max_uses,
        })
        .await
        .expect("falha ao provisionar chave");
    key_value
}

#[tokio::test]
async fn register_creates_account_profile_and_burns_one_use() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let key_value = provision_key(&state, UserRole::Staff, Some(2)).await;
    let payload = register_payload(UserRole::Staff, &key_value);
    let email = payload.email.clone();

    let token = state.auth_service.register_user(payload).await.unwrap();

    // O token já sai válido, e o perfil nasce com o papel da chave.
    let (account, profile) = state.auth_service.validate_token(&token).await.unwrap();
    assert_eq!(account.email, email);
    assert_eq!(profile.role, UserRole::Staff);
    assert_eq!(profile.account_id, account.id);

    // Um uso queimado, um restante.
    let consume = state.access_key_service.consume(&key_value, None).await.unwrap();
    assert!(consume.success);
    assert_eq!(consume.new_use_count, Some(2));
}

#[tokio::test]
async fn register_refuses_role_mismatched_key() {
    let Some(state) = common::test_state().await else {
        return;
    };

    // Chave emitida para customer não eleva um pedido de staff.
    let key_value = provision_key(&state, UserRole::Customer, None).await;
    let payload = register_payload(UserRole::Staff, &key_value);
    let email = payload.email.clone();

    let err = state.auth_service.register_user(payload).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidAccessKey(InvalidKeyReason::RoleMismatch)
    ));

    // Nada foi escrito: a conta não existe.
    let user_repo = UserRepository::new(state.db_pool.clone());
    assert!(user_repo.find_by_email(&email).await.unwrap().is_none());
}

#[tokio::test]
async fn register_with_exhausted_key_leaves_no_orphan_account() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let key_value = provision_key(&state, UserRole::Customer, Some(1)).await;
    let first = register_payload(UserRole::Customer, &key_value);
    state.auth_service.register_user(first).await.unwrap();

    // Segundo registro contra a mesma chave de uso único.
    let second = register_payload(UserRole::Customer, &key_value);
    let email = second.email.clone();
    let err = state.auth_service.register_user(second).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidAccessKey(_)));

    let user_repo = UserRepository::new(state.db_pool.clone());
    assert!(user_repo.find_by_email(&email).await.unwrap().is_none());
}

#[tokio::test]
async fn second_profile_for_same_account_is_rejected() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let account_id = common::create_account(&state.db_pool).await;

    state
        .profile_service
        .create_profile(
            &state.db_pool,
            account_id,
            UserRole::Customer,
            None,
            "Primeiro Perfil",
            None,
        )
        .await
        .unwrap();

    // A segunda criação cai na constraint de unicidade, nunca
    // sobrescreve em silêncio.
    let err = state
        .profile_service
        .create_profile(
            &state.db_pool,
            account_id,
            UserRole::Admin,
            None,
            "Segundo Perfil",
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateProfile));

    let profile = state.profile_service.get_profile(account_id).await.unwrap();
    assert_eq!(profile.role, UserRole::Customer);
    assert_eq!(profile.full_name, "Primeiro Perfil");
}

#[tokio::test]
async fn login_round_trip_after_registration() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let key_value = provision_key(&state, UserRole::Customer, None).await;
    let payload = register_payload(UserRole::Customer, &key_value);
    let email = payload.email.clone();
    state.auth_service.register_user(payload).await.unwrap();

    let token = state
        .auth_service
        .login_user(&email, "senha-secreta")
        .await
        .unwrap();
    let (account, _) = state.auth_service.validate_token(&token).await.unwrap();
    assert_eq!(account.email, email);

    let err = state
        .auth_service
        .login_user(&email, "senha-errada")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}
