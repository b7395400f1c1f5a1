// tests/access_keys.rs
//
// A propriedade central das chaves de acesso: com max_uses = N, o
// número de consumos bem-sucedidos nunca passa de N, mesmo com N
// chamadas simultâneas disputando a mesma chave.

mod common;

use barbershop_backend::models::{
    access_key::{CreateKeyPayload, InvalidKeyReason},
    profile::UserRole,
};

async fn provision_key(
    state: &barbershop_backend::config::AppState,
    role: UserRole,
    max_uses: Option<i32>,
) -> String {
    let key_value = common::unique("CHAVE");
    state
        .access_key_service
        .create_key(CreateKeyPayload {
            name: common::unique("chave de teste"),
            key_value: Some(key_value.clone()),
            role,
            max_uses,
        })
        .await
        .expect("falha ao provisionar chave");
    key_value
}

#[tokio::test]
async fn validate_is_pure_and_reports_reasons() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let key_value = provision_key(&state, UserRole::Staff, Some(1)).await;

    // Válida para o papel certo, inválida para o errado; nada de
    // contador mexido em nenhuma das duas consultas.
    let ok = state
        .access_key_service
        .validate(&key_value, UserRole::Staff)
        .await
        .unwrap();
    assert!(ok.valid);
    assert!(ok.key_name.is_some());

    let mismatch = state
        .access_key_service
        .validate(&key_value, UserRole::Admin)
        .await
        .unwrap();
    assert!(!mismatch.valid);
    assert_eq!(mismatch.reason, Some(InvalidKeyReason::RoleMismatch));

    let consumed = state
        .access_key_service
        .consume(&key_value, Some(UserRole::Staff))
        .await
        .unwrap();
    assert!(consumed.success);
    assert_eq!(consumed.new_use_count, Some(1));
}

#[tokio::test]
async fn unknown_key_is_a_typed_refusal_not_an_error() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let outcome = state
        .access_key_service
        .validate("CHAVE-QUE-NAO-EXISTE", UserRole::Customer)
        .await
        .unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.reason, Some(InvalidKeyReason::NotFound));

    let consume = state
        .access_key_service
        .consume("CHAVE-QUE-NAO-EXISTE", None)
        .await
        .unwrap();
    assert!(!consume.success);
}

#[tokio::test]
async fn deactivated_key_stops_validating_and_consuming() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let key_value = provision_key(&state, UserRole::Customer, None).await;
    let key = state
        .access_key_service
        .list_keys()
        .await
        .unwrap()
        .into_iter()
        .find(|k| k.key_value == key_value)
        .expect("chave recém-criada deveria aparecer na listagem");

    state
        .access_key_service
        .deactivate_key(key.id)
        .await
        .unwrap();

    let outcome = state
        .access_key_service
        .validate(&key_value, UserRole::Customer)
        .await
        .unwrap();
    assert_eq!(outcome.reason, Some(InvalidKeyReason::Inactive));

    let consume = state
        .access_key_service
        .consume(&key_value, None)
        .await
        .unwrap();
    assert!(!consume.success);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_consumes_never_overshoot_max_uses() {
    let Some(state) = common::test_state().await else {
        return;
    };

    // O cenário clássico: chave de staff com um único uso, dois (aqui
    // oito) registros simultâneos. Exatamente um passa.
    let key_value = provision_key(&state, UserRole::Staff, Some(1)).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = state.access_key_service.clone();
        let key_value = key_value.clone();
        handles.push(tokio::spawn(async move {
            service.consume(&key_value, Some(UserRole::Staff)).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if outcome.success {
            successes += 1;
            assert_eq!(outcome.new_use_count, Some(1));
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn successful_consumes_equal_min_of_limit_and_attempts() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let key_value = provision_key(&state, UserRole::Customer, Some(3)).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let service = state.access_key_service.clone();
        let key_value = key_value.clone();
        handles.push(tokio::spawn(
            async move { service.consume(&key_value, None).await },
        ));
    }

    let mut successes = 0;
    let mut counts = Vec::new();
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if outcome.success {
            successes += 1;
            counts.push(outcome.new_use_count.unwrap());
        }
    }

    // min(3, 10) consumos passam, e os contadores devolvidos são
    // exatamente 1, 2 e 3 (cada um visto uma única vez).
    assert_eq!(successes, 3);
    counts.sort_unstable();
    assert_eq!(counts, vec![1, 2, 3]);

    let final_state = state
        .access_key_service
        .validate(&key_value, UserRole::Customer)
        .await
        .unwrap();
    assert_eq!(final_state.reason, Some(InvalidKeyReason::Exhausted));
}
