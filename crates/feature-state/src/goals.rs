//! Monthly income goal.

use crate::{FeatureError, FeatureResult};
use local_store::{LocalStoreExt, SharedStore, StorageError, StorageKeys};
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Target used until the user sets one.
pub const DEFAULT_MONTHLY_TARGET: f64 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Goal {
    monthly_target: f64,
    achieved: f64,
}

/// Monthly target and amount achieved so far.
pub struct GoalTracker {
    store: SharedStore,
    goal: Mutex<Goal>,
}

/// Parse a user-entered amount such as `"1500"` or `" 99.5 "`.
pub fn parse_amount(input: &str) -> FeatureResult<f64> {
    let trimmed = input.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| FeatureError::InvalidAmount(format!("'{}' is not a number", trimmed)))
}

impl GoalTracker {
    /// Load both values, falling back to the defaults for missing or
    /// unreadable entries.
    pub fn load(store: SharedStore) -> FeatureResult<Self> {
        let monthly_target = read_amount(&store, StorageKeys::MONTHLY_TARGET)?
            .filter(|target| *target > 0.0)
            .unwrap_or(DEFAULT_MONTHLY_TARGET);
        let achieved = read_amount(&store, StorageKeys::ACHIEVED_THIS_MONTH)?
            .filter(|achieved| *achieved >= 0.0)
            .unwrap_or(0.0);

        debug!(monthly_target, achieved, "Loaded monthly goal");
        Ok(Self {
            store,
            goal: Mutex::new(Goal {
                monthly_target,
                achieved,
            }),
        })
    }

    pub fn monthly_target(&self) -> f64 {
        self.goal.lock().monthly_target
    }

    pub fn achieved(&self) -> f64 {
        self.goal.lock().achieved
    }

    /// Achieved as a percentage of the target, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        let goal = *self.goal.lock();
        (goal.achieved / goal.monthly_target * 100.0).min(100.0)
    }

    /// Amount still missing to reach the target, never negative.
    pub fn remaining(&self) -> f64 {
        let goal = *self.goal.lock();
        (goal.monthly_target - goal.achieved).max(0.0)
    }

    pub fn set_monthly_target(&self, amount: f64) -> FeatureResult<()> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(FeatureError::InvalidAmount(format!(
                "monthly target must be greater than zero, got {}",
                amount
            )));
        }
        let mut goal = self.goal.lock();
        self.store.set_json(StorageKeys::MONTHLY_TARGET, &amount)?;
        goal.monthly_target = amount;
        debug!(monthly_target = amount, "Monthly target updated");
        Ok(())
    }

    pub fn set_achieved(&self, amount: f64) -> FeatureResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(FeatureError::InvalidAmount(format!(
                "achieved amount cannot be negative, got {}",
                amount
            )));
        }
        let mut goal = self.goal.lock();
        self.store.set_json(StorageKeys::ACHIEVED_THIS_MONTH, &amount)?;
        goal.achieved = amount;
        debug!(achieved = amount, "Achieved amount updated");
        Ok(())
    }
}

fn read_amount(store: &SharedStore, key: &str) -> FeatureResult<Option<f64>> {
    match store.get_json::<f64>(key) {
        Ok(amount) => Ok(amount.filter(|a| a.is_finite())),
        Err(StorageError::Encoding { key, source }) => {
            warn!(key = %key, error = %source, "Ignoring unreadable amount");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
