//! Deduction edits applied to the app store.
//!
//! Each edit validates first, then replaces the whole state through
//! `AppStore::update` / `try_update`, so the list never holds an invalid
//! entry. Id lookups run inside the update, under the store lock.

use tracing::info;
use uuid::Uuid;

use super::model::Deduction;
use crate::error::{DeductionError, Error, Result};
use crate::store::{AppState, AppStore};

/// Append a deduction. Insertion order is kept.
pub fn add_deduction(store: &AppStore, deduction: Deduction) -> Result<AppState> {
    deduction.validate()?;
    let id = deduction.id;
    let category = deduction.category;
    let state = store.update(|state| state.deductions.push(deduction))?;
    info!(deduction_id = %id, category = %category, "Deduction added");
    Ok(state)
}

/// Replace the deduction with the same id, keeping its position.
pub fn update_deduction(store: &AppStore, deduction: Deduction) -> Result<AppState> {
    deduction.validate()?;
    let id = deduction.id;
    let state = store.try_update(|state| {
        let slot = state
            .deductions
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(DeductionError::NotFound { id })?;
        *slot = deduction;
        Ok::<_, Error>(())
    })?;
    info!(deduction_id = %id, "Deduction updated");
    Ok(state)
}

/// Remove a deduction by id.
pub fn remove_deduction(store: &AppStore, id: Uuid) -> Result<AppState> {
    let state = store.try_update(|state| {
        let position = state
            .deductions
            .iter()
            .position(|d| d.id == id)
            .ok_or(DeductionError::NotFound { id })?;
        state.deductions.remove(position);
        Ok::<_, Error>(())
    })?;
    info!(deduction_id = %id, "Deduction removed");
    Ok(state)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::deductions::DeductionCategory;

    fn deduction(description: &str) -> Deduction {
        Deduction::new(
            DeductionCategory::Other,
            description,
            dec!(10),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        )
    }

    #[test]
    fn add_keeps_insertion_order() {
        let store = AppStore::in_memory();
        add_deduction(&store, deduction("first")).unwrap();
        add_deduction(&store, deduction("second")).unwrap();
        let state = add_deduction(&store, deduction("third")).unwrap();

        let names: Vec<_> = state.deductions.iter().map(|d| d.description.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
        assert_eq!(store.get_state(), state);
    }

    #[test]
    fn add_rejects_invalid() {
        let store = AppStore::in_memory();
        let bad = deduction("bad").with_claim_percentage(dec!(150));
        let err = add_deduction(&store, bad).unwrap_err();
        assert!(matches!(
            err,
            Error::Deduction(DeductionError::InvalidClaimPercentage { .. })
        ));
        assert!(store.get_state().deductions.is_empty());
    }

    #[test]
    fn update_replaces_in_place() {
        let store = AppStore::in_memory();
        let a = deduction("a");
        let b = deduction("b");
        add_deduction(&store, a.clone()).unwrap();
        add_deduction(&store, b.clone()).unwrap();

        let edited = Deduction {
            amount: dec!(99),
            ..a.clone()
        };
        let state = update_deduction(&store, edited).unwrap();
        assert_eq!(state.deductions[0].id, a.id);
        assert_eq!(state.deductions[0].amount, dec!(99));
        assert_eq!(state.deductions[1], b);
    }

    #[test]
    fn update_unknown_is_not_found() {
        let store = AppStore::in_memory();
        add_deduction(&store, deduction("kept")).unwrap();
        let rx = store.subscribe();

        let err = update_deduction(&store, deduction("ghost")).unwrap_err();
        assert!(matches!(err, Error::Deduction(DeductionError::NotFound { .. })));
        assert_eq!(store.get_state().deductions.len(), 1);
        // Nothing was written, so nobody is notified.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn update_after_removal_is_not_found() {
        let store = AppStore::in_memory();
        let a = deduction("a");
        add_deduction(&store, a.clone()).unwrap();
        remove_deduction(&store, a.id).unwrap();

        let err = update_deduction(&store, Deduction { amount: dec!(5), ..a }).unwrap_err();
        assert!(matches!(err, Error::Deduction(DeductionError::NotFound { .. })));
        assert!(store.get_state().deductions.is_empty());
    }

    #[test]
    fn add_rejects_oversized_amount() {
        let store = AppStore::in_memory();
        let huge = Deduction {
            amount: dec!(1000000000000000000000000000),
            ..deduction("yacht")
        };
        let err = add_deduction(&store, huge).unwrap_err();
        assert!(matches!(
            err,
            Error::Deduction(DeductionError::AmountTooLarge { .. })
        ));
        assert!(store.get_state().deductions.is_empty());
    }

    #[test]
    fn remove_by_id() {
        let store = AppStore::in_memory();
        let a = deduction("a");
        add_deduction(&store, a.clone()).unwrap();
        add_deduction(&store, deduction("b")).unwrap();

        let state = remove_deduction(&store, a.id).unwrap();
        assert_eq!(state.deductions.len(), 1);
        assert_eq!(state.deductions[0].description, "b");

        assert!(remove_deduction(&store, a.id).is_err());
    }
}
