//! End-to-end tests: onboarding, deductions, and estimates over a
//! file-backed store that is reopened between steps.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use tax_mate::deductions::{self, Deduction, DeductionCategory};
use tax_mate::onboarding::{FinancialYearEnd, OnboardingForm, OnboardingPhase, ProfileBuilder};
use tax_mate::store::{APP_STATE_KEY, AppState, AppStore, CurrentStep, PersistentStore, StateEvent};
use tax_mate::tax;

fn open(dir: &Path) -> Arc<AppStore> {
    let store = PersistentStore::open(dir).expect("open store");
    Arc::new(AppStore::new(store))
}

fn form() -> OnboardingForm {
    OnboardingForm {
        occupation: "tradie".to_string(),
        employment_type: "employee".to_string(),
        income_range: "45001-120000".to_string(),
        first_name: "Jordan".to_string(),
        last_name: "Lee".to_string(),
        email: "jordan@example.com".to_string(),
        annual_income: Some(dec!(80000)),
        has_work_vehicle: true,
        ..OnboardingForm::default()
    }
}

fn complete_onboarding(store: &Arc<AppStore>) {
    let mut builder = ProfileBuilder::start(Arc::clone(store));
    while !builder.phase().is_terminal() {
        let outcome = builder.attempt_advance(form());
        assert!(outcome.ok, "blocked at {}: {:?}", builder.phase(), outcome.errors);
    }
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, day).unwrap()
}

#[test]
fn fresh_directory_needs_onboarding() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    let state = store.get_state();
    assert_eq!(state, AppState::default());
    assert!(state.needs_onboarding());
}

#[test]
fn onboarding_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    complete_onboarding(&store);
    drop(store);

    let reopened = open(dir.path());
    let state = reopened.get_state();
    assert!(state.onboarding_complete);
    assert!(state.is_consistent());
    assert_eq!(state.current_step, Some(CurrentStep::Completed));

    let user = state.user.expect("profile persisted");
    assert_eq!(user.full_name(), "Jordan Lee");
    assert_eq!(user.financial_year_end, FinancialYearEnd::AustralianFy);
    assert!(user.has_work_vehicle);
}

#[test]
fn interrupted_onboarding_keeps_provisional_profile() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    let mut builder = ProfileBuilder::start(Arc::clone(&store));
    while builder.phase() != OnboardingPhase::Identity {
        assert!(builder.attempt_advance(form()).ok);
    }
    drop(builder);
    drop(store);

    let reopened = open(dir.path());
    let state = reopened.get_state();
    assert!(!state.onboarding_complete);
    assert_eq!(state.user.as_ref().map(|u| u.occupation.as_str()), Some("tradie"));

    let resumed = ProfileBuilder::resume(Arc::clone(&reopened));
    assert_eq!(resumed.phase(), OnboardingPhase::Identity);
    assert_eq!(resumed.form().occupation, "tradie");
}

#[test]
fn deductions_and_refund_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    complete_onboarding(&store);

    deductions::add_deduction(
        &store,
        Deduction::new(DeductionCategory::ToolsEquipment, "Drill kit", dec!(1000), date(2)),
    )
    .unwrap();
    deductions::add_deduction(
        &store,
        Deduction::new(DeductionCategory::PhoneInternet, "Mobile", dec!(500), date(9))
            .with_claim_percentage(dec!(50)),
    )
    .unwrap();
    drop(store);

    let reopened = open(dir.path());
    let state = reopened.get_state();
    assert_eq!(state.deductions.len(), 2);

    let refund = tax::calculate_potential_refund(&state.deductions, state.user.as_ref());
    assert_eq!(refund, dec!(406.25));
    assert_eq!(tax::format_currency(refund), "$406");

    let occupation = &state.user.as_ref().unwrap().occupation;
    assert_eq!(
        tax::recommended_categories(occupation)[0],
        DeductionCategory::ToolsEquipment
    );
}

#[test]
fn completed_profile_edit_keeps_identity() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    complete_onboarding(&store);
    let original = store.get_state().user.unwrap();

    let mut builder = ProfileBuilder::resume(Arc::clone(&store));
    assert_eq!(builder.phase(), OnboardingPhase::Identity);

    let mut edited = builder.form().clone();
    edited.first_name = "Jo".to_string();
    edited.financial_year_end = "31-12".to_string();
    let outcome = builder.finish(edited);
    assert!(outcome.ok, "{:?}", outcome.errors);

    let user = open(dir.path()).get_state().user.unwrap();
    assert_eq!(user.id, original.id);
    assert_eq!(user.created_at, original.created_at);
    assert_eq!(user.first_name, "Jo");
    assert_eq!(user.financial_year_end, FinancialYearEnd::CalendarYear);
}

#[test]
fn corrupt_file_reads_as_default() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(format!("{APP_STATE_KEY}.json")),
        "{\"user\": {\"firstName\": ",
    )
    .unwrap();

    let store = open(dir.path());
    assert_eq!(store.get_state(), AppState::default());

    // The next write replaces the garbage.
    store.update(|s| s.onboarding_complete = false).unwrap();
    let raw = std::fs::read_to_string(dir.path().join(format!("{APP_STATE_KEY}.json"))).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["onboardingComplete"], false);
    assert_eq!(parsed["deductions"], serde_json::json!([]));
}

#[test]
fn reset_clears_persisted_state_and_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    complete_onboarding(&store);
    let events = store.subscribe();

    store.reset_state().unwrap();
    assert_eq!(events.try_recv().unwrap(), StateEvent::Reset);
    assert_eq!(open(dir.path()).get_state(), AppState::default());
}
