// tests/tenancy.rs
//
// O registro de tenancy (alocação de capsters entre filiais) e a visão
// de disponibilidade que o motor de admissão consulta.

mod common;

use rust_decimal::Decimal;

use barbershop_backend::{
    common::error::AppError,
    config::AppState,
    models::tenancy::{Branch, Organization},
};

async fn org_with_branch(state: &AppState) -> (Organization, Branch) {
    let org = state
        .tenancy_service
        .create_organization(&common::unique("Rede"))
        .await
        .unwrap();
    let branch = state
        .tenancy_service
        .create_branch(org.id, &common::unique("Filial"), None, None)
        .await
        .unwrap();
    (org, branch)
}

#[tokio::test]
async fn capster_never_crosses_organizations() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let (_org_a, branch_a) = org_with_branch(&state).await;
    let (_org_b, branch_b) = org_with_branch(&state).await;

    let capster = common::bookable_capster(&state, branch_a.id, None).await;

    // Para a filial de outra rede: rejeitado inteiro.
    let err = state
        .tenancy_service
        .assign_capster_to_branch(capster.id, branch_b.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::CrossOrganizationAssignment));

    let unchanged = state.tenancy_service.get_capster(capster.id).await.unwrap();
    assert_eq!(unchanged.branch_id, Some(branch_a.id));
}

#[tokio::test]
async fn unassigned_capster_can_join_any_organization() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let (_org, branch) = org_with_branch(&state).await;

    // Sem filial atual não há organização derivada, então a primeira
    // alocação é livre.
    let capster = state
        .tenancy_service
        .create_capster(&common::unique("Capster"), None, None, None)
        .await
        .unwrap();
    assert_eq!(capster.branch_id, None);

    let assigned = state
        .tenancy_service
        .assign_capster_to_branch(capster.id, branch.id)
        .await
        .unwrap();
    assert_eq!(assigned.branch_id, Some(branch.id));

    // Desalocar detacha, nunca apaga.
    let unassigned = state
        .tenancy_service
        .unassign_capster(capster.id)
        .await
        .unwrap();
    assert_eq!(unassigned.branch_id, None);
}

#[tokio::test]
async fn availability_filters_to_the_bookable_set() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let (_org, branch) = org_with_branch(&state).await;

    let ready = common::bookable_capster(&state, branch.id, None).await;

    // Criado mas nunca aprovado.
    let pending = state
        .tenancy_service
        .create_capster(&common::unique("Novato"), Some(branch.id), None, None)
        .await
        .unwrap();

    // Aprovado, mas fora de serviço.
    let off_duty = common::bookable_capster(&state, branch.id, None).await;
    state
        .tenancy_service
        .set_capster_availability(off_duty.id, false, &common::admin_profile())
        .await
        .unwrap();

    let bookable = state
        .availability_service
        .bookable_capsters(branch.id, None)
        .await
        .unwrap();
    let ids: Vec<_> = bookable.iter().map(|c| c.id).collect();
    assert!(ids.contains(&ready.id));
    assert!(!ids.contains(&pending.id));
    assert!(!ids.contains(&off_duty.id));
}

#[tokio::test]
async fn capster_with_specific_service_list_only_matches_those() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let (org, branch) = org_with_branch(&state).await;

    let corte = state
        .tenancy_service
        .create_service(
            org.id,
            Some(branch.id),
            &common::unique("Corte"),
            Decimal::new(5000, 2),
            30,
        )
        .await
        .unwrap();
    let barba = state
        .tenancy_service
        .create_service(
            org.id,
            Some(branch.id),
            &common::unique("Barba"),
            Decimal::new(3000, 2),
            20,
        )
        .await
        .unwrap();

    // Especialista só em corte; generalista sem lista atende tudo.
    let specialist = common::bookable_capster(&state, branch.id, Some(vec![corte.id])).await;
    let generalist = common::bookable_capster(&state, branch.id, None).await;

    let for_corte = state
        .availability_service
        .bookable_capsters(branch.id, Some(corte.id))
        .await
        .unwrap();
    let ids: Vec<_> = for_corte.iter().map(|c| c.id).collect();
    assert!(ids.contains(&specialist.id));
    assert!(ids.contains(&generalist.id));

    let for_barba = state
        .availability_service
        .bookable_capsters(branch.id, Some(barba.id))
        .await
        .unwrap();
    let ids: Vec<_> = for_barba.iter().map(|c| c.id).collect();
    assert!(!ids.contains(&specialist.id));
    assert!(ids.contains(&generalist.id));
}

#[tokio::test]
async fn branch_catalog_mixes_own_and_organization_wide_services() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let (org, branch) = org_with_branch(&state).await;
    let other_branch = state
        .tenancy_service
        .create_branch(org.id, &common::unique("Outra Filial"), None, None)
        .await
        .unwrap();
    let (_foreign_org, foreign_branch) = org_with_branch(&state).await;

    let own = state
        .tenancy_service
        .create_service(
            org.id,
            Some(branch.id),
            &common::unique("Corte"),
            Decimal::new(5000, 2),
            30,
        )
        .await
        .unwrap();
    let org_wide = state
        .tenancy_service
        .create_service(
            org.id,
            None,
            &common::unique("Sobrancelha"),
            Decimal::new(1500, 2),
            10,
        )
        .await
        .unwrap();
    let elsewhere = state
        .tenancy_service
        .create_service(
            org.id,
            Some(other_branch.id),
            &common::unique("Pigmentação"),
            Decimal::new(8000, 2),
            45,
        )
        .await
        .unwrap();

    let visible = state
        .availability_service
        .active_services(branch.id)
        .await
        .unwrap();
    let ids: Vec<_> = visible.iter().map(|s| s.id).collect();
    assert!(ids.contains(&own.id));
    assert!(ids.contains(&org_wide.id));
    assert!(!ids.contains(&elsewhere.id));

    // A filial de outra rede não enxerga nada disso, nem o serviço de
    // rede inteira.
    let foreign_view = state
        .availability_service
        .active_services(foreign_branch.id)
        .await
        .unwrap();
    let foreign_ids: Vec<_> = foreign_view.iter().map(|s| s.id).collect();
    assert!(!foreign_ids.contains(&own.id));
    assert!(!foreign_ids.contains(&org_wide.id));
}

#[tokio::test]
async fn service_scoped_to_foreign_branch_is_refused_at_creation() {
    let Some(state) = common::test_state().await else {
        return;
    };

    let (org_a, _branch_a) = org_with_branch(&state).await;
    let (_org_b, branch_b) = org_with_branch(&state).await;

    let err = state
        .tenancy_service
        .create_service(
            org_a.id,
            Some(branch_b.id),
            &common::unique("Corte"),
            Decimal::new(5000, 2),
            30,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::CrossOrganizationAssignment));
}
