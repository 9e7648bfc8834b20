//! 372 Pages game logic: pure functions, fully testable.
//!
//! Each handler checks its precondition first and leaves the state untouched
//! when it fails. Rendering, saving and timers live in `session`.

use std::fmt;

use thiserror::Error;

use crate::economy::{EconomyConfig, PassiveIncome, ResourceKind};
use crate::state::GameState;

/// A guarded transition that could not run. `Display` is the player-facing text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("You don't have enough clicks! Wait for them to regenerate.")]
    NoClicks,
    #[error("Not enough resources to convert for {kind}. You need {required} but have {available}.")]
    NotEnoughResources {
        kind: ResourceKind,
        required: u64,
        available: u64,
    },
    #[error("Not enough 372 Pages to buy this upgrade. You need {required} but have {available}.")]
    NotEnoughPages {
        kind: ResourceKind,
        required: u64,
        available: u64,
    },
}

/// Result of a successful `convert`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    pub kind: ResourceKind,
    pub spent: u64,
    pub produced: u64,
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Converted {} {} resource into {} 372 Pages!",
            self.spent, self.kind, self.produced
        )
    }
}

/// Result of a successful `buy_upgrade`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Purchase {
    pub kind: ResourceKind,
    pub cost: u64,
    /// Level after the purchase.
    pub level: u64,
    /// Set when the purchase needs its passive timer (re)started.
    pub passive: Option<PassiveIncome>,
}

impl fmt::Display for Purchase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Successfully purchased upgrade for {}!", self.kind)
    }
}

/// Spend one click reading `kind`. Returns the resources gained.
pub fn read(
    state: &mut GameState,
    config: &EconomyConfig,
    kind: ResourceKind,
) -> Result<u64, ActionError> {
    if !state.spend_click() {
        return Err(ActionError::NoClicks);
    }
    let gain = config.read_yield(kind, state.upgrade_levels[kind]);
    state.resources[kind] = state.resources[kind].saturating_add(gain);
    Ok(gain)
}

/// Turn one conversion's worth of `kind` into 372 Pages.
pub fn convert(
    state: &mut GameState,
    config: &EconomyConfig,
    kind: ResourceKind,
) -> Result<Conversion, ActionError> {
    let rate = config.conversion[kind];
    let available = state.resources[kind];
    if available < rate.cost {
        return Err(ActionError::NotEnoughResources {
            kind,
            required: rate.cost,
            available,
        });
    }
    state.resources[kind] = available - rate.cost;
    state.currency = state.currency.saturating_add(rate.output);
    Ok(Conversion {
        kind,
        spent: rate.cost,
        produced: rate.output,
    })
}

/// Raise the upgrade level of `kind` by one.
pub fn buy_upgrade(
    state: &mut GameState,
    config: &EconomyConfig,
    kind: ResourceKind,
) -> Result<Purchase, ActionError> {
    let cost = config.upgrades[kind].cost;
    if state.currency < cost {
        return Err(ActionError::NotEnoughPages {
            kind,
            required: cost,
            available: state.currency,
        });
    }
    state.currency -= cost;
    state.upgrade_levels[kind] = state.upgrade_levels[kind].saturating_add(1);
    Ok(Purchase {
        kind,
        cost,
        level: state.upgrade_levels[kind],
        passive: config.passive(kind),
    })
}

/// One click-regen fire. Returns the clicks actually restored.
pub fn regen_tick(state: &mut GameState, config: &EconomyConfig) -> u32 {
    state.add_clicks(config.regen_per_tick, config.max_clicks)
}

/// One passive-income fire for the upgrade `kind`. Uses the level at fire time.
/// Returns the amount granted to the upgrade's target resource.
pub fn passive_tick(state: &mut GameState, config: &EconomyConfig, kind: ResourceKind) -> u64 {
    let Some(passive) = config.passive(kind) else {
        return 0;
    };
    let grant = passive.rate.saturating_mul(state.upgrade_levels[kind]);
    let target = &mut state.resources[passive.target];
    *target = target.saturating_add(grant);
    grant
}

/// Clicks that regenerate over `elapsed_ms` of wall-clock time.
pub fn offline_clicks(config: &EconomyConfig, elapsed_ms: u64) -> u32 {
    if config.regen_interval_ms == 0 {
        return 0;
    }
    let ticks = elapsed_ms / config.regen_interval_ms;
    let clicks = ticks.saturating_mul(u64::from(config.regen_per_tick));
    u32::try_from(clicks).unwrap_or(u32::MAX)
}

/// Credit click regeneration for the time since `last_update_time`.
///
/// A timestamp in the future counts as zero elapsed time. A pool that is
/// already full is left alone. Returns the clicks credited.
pub fn reconcile_offline(state: &mut GameState, config: &EconomyConfig, now_ms: u64) -> u32 {
    let elapsed = now_ms.saturating_sub(state.last_update_time);
    let credited = if state.clicks < config.max_clicks {
        state.add_clicks(offline_clicks(config, elapsed), config.max_clicks)
    } else {
        0
    };
    state.last_update_time = now_ms;
    credited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::{ConversionRate, PerKind, UpgradeSpec};

    fn fresh() -> (GameState, EconomyConfig) {
        let config = EconomyConfig::default();
        (GameState::new(&config, 0), config)
    }

    #[test]
    fn read_spends_click_and_adds_base_rate() {
        let (mut state, config) = fresh();
        assert_eq!(read(&mut state, &config, ResourceKind::Armada), Ok(1));
        assert_eq!(state.clicks, 371);
        assert_eq!(state.resources.armada, 1);
    }

    #[test]
    fn read_with_upgrade_levels() {
        let (mut state, config) = fresh();
        state.upgrade_levels.rp1 = 2;
        let before = state.clicks;
        read(&mut state, &config, ResourceKind::Rp1).unwrap();
        assert_eq!(state.resources.rp1, 3); // 1 + 2 * 1
        assert_eq!(state.clicks, before - 1);
    }

    #[test]
    fn read_passive_upgrade_does_not_boost_click() {
        let (mut state, config) = fresh();
        state.upgrade_levels.uglylove = 4;
        read(&mut state, &config, ResourceKind::UglyLove).unwrap();
        assert_eq!(state.resources.uglylove, 1);
    }

    #[test]
    fn read_without_clicks_changes_nothing() {
        let (mut state, config) = fresh();
        state.clicks = 0;
        state.resources.rp1 = 4;
        let before = state.clone();
        let err = read(&mut state, &config, ResourceKind::Rp1).unwrap_err();
        assert_eq!(err, ActionError::NoClicks);
        assert_eq!(state, before);
        assert_eq!(
            err.to_string(),
            "You don't have enough clicks! Wait for them to regenerate."
        );
    }

    #[test]
    fn convert_eye_of_argon() {
        let (mut state, config) = fresh();
        state.resources.eyeofargon = 5;
        let receipt = convert(&mut state, &config, ResourceKind::EyeOfArgon).unwrap();
        assert_eq!(state.resources.eyeofargon, 0);
        assert_eq!(state.currency, 1);
        assert_eq!(
            receipt.to_string(),
            "Converted 5 eyeofargon resource into 1 372 Pages!"
        );
    }

    #[test]
    fn convert_leaves_remainder() {
        let (mut state, config) = fresh();
        state.resources.rp1 = 23;
        convert(&mut state, &config, ResourceKind::Rp1).unwrap();
        assert_eq!(state.resources.rp1, 13);
    }

    #[test]
    fn convert_shortfall_reports_exact_counts() {
        let (mut state, config) = fresh();
        state.resources.uglylove = 19;
        let before = state.clone();
        let err = convert(&mut state, &config, ResourceKind::UglyLove).unwrap_err();
        assert_eq!(
            err,
            ActionError::NotEnoughResources {
                kind: ResourceKind::UglyLove,
                required: 20,
                available: 19,
            }
        );
        assert_eq!(
            err.to_string(),
            "Not enough resources to convert for uglylove. You need 20 but have 19."
        );
        assert_eq!(state, before);
    }

    #[test]
    fn buy_upgrade_spends_currency() {
        let (mut state, config) = fresh();
        state.currency = 12;
        let purchase = buy_upgrade(&mut state, &config, ResourceKind::Rp1).unwrap();
        assert_eq!(state.currency, 2);
        assert_eq!(state.upgrade_levels.rp1, 1);
        assert_eq!(purchase.level, 1);
        assert!(purchase.passive.is_none());
        assert_eq!(purchase.to_string(), "Successfully purchased upgrade for rp1!");
    }

    #[test]
    fn buy_passive_upgrade_reports_timer() {
        let (mut state, config) = fresh();
        state.currency = 50;
        let purchase = buy_upgrade(&mut state, &config, ResourceKind::Armada).unwrap();
        let passive = purchase.passive.unwrap();
        assert_eq!(passive.interval_ms, 5_000);
        assert_eq!(passive.target, ResourceKind::Armada);
        assert_eq!(state.currency, 0);
    }

    #[test]
    fn buy_upgrade_shortfall_reports_exact_counts() {
        let (mut state, config) = fresh();
        state.currency = 74;
        let before = state.clone();
        let err = buy_upgrade(&mut state, &config, ResourceKind::UglyLove).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not enough 372 Pages to buy this upgrade. You need 75 but have 74."
        );
        assert_eq!(state, before);
    }

    #[test]
    fn regen_tick_caps() {
        let (mut state, config) = fresh();
        assert_eq!(regen_tick(&mut state, &config), 0);
        state.clicks = 10;
        assert_eq!(regen_tick(&mut state, &config), 1);
        assert_eq!(state.clicks, 11);
    }

    #[test]
    fn passive_tick_scales_with_level() {
        let (mut state, config) = fresh();
        state.upgrade_levels.uglylove = 3;
        assert_eq!(passive_tick(&mut state, &config, ResourceKind::UglyLove), 3);
        assert_eq!(state.resources.uglylove, 3);
        // Non-passive kinds grant nothing.
        state.upgrade_levels.rp1 = 9;
        assert_eq!(passive_tick(&mut state, &config, ResourceKind::Rp1), 0);
        assert_eq!(state.resources.rp1, 0);
    }

    #[test]
    fn passive_tick_honours_explicit_target() {
        let mut config = EconomyConfig::default();
        if let Some(passive) = config.upgrades.armada.passive.as_mut() {
            passive.target = ResourceKind::Rp1;
        }
        let mut state = GameState::new(&config, 0);
        state.upgrade_levels.armada = 2;
        passive_tick(&mut state, &config, ResourceKind::Armada);
        assert_eq!(state.resources.rp1, 2);
        assert_eq!(state.resources.armada, 0);
    }

    #[test]
    fn reconcile_offline_caps_at_max() {
        let (mut state, config) = fresh();
        state.clicks = 370;
        state.last_update_time = 100_000 - 12_000;
        assert_eq!(reconcile_offline(&mut state, &config, 100_000), 2);
        assert_eq!(state.clicks, 372);
        assert_eq!(state.last_update_time, 100_000);
    }

    #[test]
    fn reconcile_offline_floors_partial_ticks() {
        let (mut state, config) = fresh();
        state.clicks = 0;
        state.last_update_time = 0;
        assert_eq!(reconcile_offline(&mut state, &config, 11_999), 2);
        assert_eq!(state.clicks, 2);
    }

    #[test]
    fn reconcile_offline_future_timestamp_is_zero_elapsed() {
        let (mut state, config) = fresh();
        state.clicks = 5;
        state.last_update_time = 50_000;
        assert_eq!(reconcile_offline(&mut state, &config, 10_000), 0);
        assert_eq!(state.clicks, 5);
        assert_eq!(state.last_update_time, 10_000);
    }

    #[test]
    fn reconcile_offline_full_pool_untouched() {
        let (mut state, config) = fresh();
        state.last_update_time = 0;
        assert_eq!(reconcile_offline(&mut state, &config, 1_000_000), 0);
        assert_eq!(state.clicks, 372);
    }

    #[test]
    fn cheap_economy_can_be_swapped_in() {
        let config = EconomyConfig {
            conversion: PerKind::splat(ConversionRate { cost: 1, output: 10 }),
            upgrades: PerKind::splat(UpgradeSpec {
                cost: 1,
                effect: Some(5),
                passive: None,
            }),
            ..EconomyConfig::default()
        };
        let mut state = GameState::new(&config, 0);
        read(&mut state, &config, ResourceKind::Armada).unwrap();
        convert(&mut state, &config, ResourceKind::Armada).unwrap();
        buy_upgrade(&mut state, &config, ResourceKind::Armada).unwrap();
        read(&mut state, &config, ResourceKind::Armada).unwrap();
        assert_eq!(state.currency, 9);
        assert_eq!(state.resources.armada, 6);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    // ── Strategy helpers ──────────────────────────────────

    fn arb_kind() -> impl Strategy<Value = ResourceKind> {
        prop_oneof![
            Just(ResourceKind::Rp1),
            Just(ResourceKind::Armada),
            Just(ResourceKind::EyeOfArgon),
            Just(ResourceKind::UglyLove),
        ]
    }

    #[derive(Clone, Debug)]
    enum Step {
        Read(ResourceKind),
        Convert(ResourceKind),
        Buy(ResourceKind),
        Regen,
        Passive(ResourceKind),
    }

    fn arb_step() -> impl Strategy<Value = Step> {
        prop_oneof![
            4 => arb_kind().prop_map(Step::Read),
            2 => arb_kind().prop_map(Step::Convert),
            1 => arb_kind().prop_map(Step::Buy),
            2 => Just(Step::Regen),
            1 => arb_kind().prop_map(Step::Passive),
        ]
    }

    fn arb_state() -> impl Strategy<Value = GameState> {
        (0u32..=372, 0u64..200, prop::array::uniform4(0u64..100), prop::array::uniform4(0u64..5))
            .prop_map(|(clicks, currency, res, lv)| {
                let config = EconomyConfig::default();
                let mut state = GameState::new(&config, 0);
                state.clicks = clicks;
                state.currency = currency;
                for kind in ResourceKind::all() {
                    state.resources[*kind] = res[kind.index()];
                    state.upgrade_levels[*kind] = lv[kind.index()];
                }
                state
            })
    }

    // ── Invariants under arbitrary play ───────────────────

    proptest! {
        #[test]
        fn prop_clicks_stay_in_bounds(
            mut state in arb_state(),
            steps in prop::collection::vec(arb_step(), 0..200),
        ) {
            let config = EconomyConfig::default();
            for step in steps {
                let _ = match step {
                    Step::Read(k) => read(&mut state, &config, k).map(|_| ()),
                    Step::Convert(k) => convert(&mut state, &config, k).map(|_| ()),
                    Step::Buy(k) => buy_upgrade(&mut state, &config, k).map(|_| ()),
                    Step::Regen => { regen_tick(&mut state, &config); Ok(()) }
                    Step::Passive(k) => { passive_tick(&mut state, &config, k); Ok(()) }
                };
                prop_assert!(state.clicks <= config.max_clicks);
            }
        }

        #[test]
        fn prop_failed_read_is_noop(mut state in arb_state(), kind in arb_kind()) {
            let config = EconomyConfig::default();
            state.clicks = 0;
            let before = state.clone();
            prop_assert!(read(&mut state, &config, kind).is_err());
            prop_assert_eq!(state, before);
        }

        #[test]
        fn prop_failed_convert_is_noop(mut state in arb_state(), kind in arb_kind()) {
            let config = EconomyConfig::default();
            state.resources[kind] %= config.conversion[kind].cost;
            let before = state.clone();
            prop_assert!(convert(&mut state, &config, kind).is_err());
            prop_assert_eq!(state, before);
        }

        #[test]
        fn prop_failed_buy_is_noop(mut state in arb_state(), kind in arb_kind()) {
            let config = EconomyConfig::default();
            state.currency %= config.upgrades[kind].cost;
            let before = state.clone();
            prop_assert!(buy_upgrade(&mut state, &config, kind).is_err());
            prop_assert_eq!(state, before);
        }

        #[test]
        fn prop_convert_conserves_units(mut state in arb_state(), kind in arb_kind()) {
            let config = EconomyConfig::default();
            let rate = config.conversion[kind];
            let (res, cur) = (state.resources[kind], state.currency);
            if convert(&mut state, &config, kind).is_ok() {
                prop_assert_eq!(state.resources[kind], res - rate.cost);
                prop_assert_eq!(state.currency, cur + rate.output);
            }
        }

        #[test]
        fn prop_offline_regen_monotonic_and_capped(
            clicks in 0u32..=372,
            elapsed in 0u64..10_000_000,
        ) {
            let config = EconomyConfig::default();
            let mut state = GameState::new(&config, 0);
            state.clicks = clicks;
            reconcile_offline(&mut state, &config, elapsed);
            prop_assert!(state.clicks >= clicks);
            prop_assert!(state.clicks <= config.max_clicks);
            let expected = (clicks as u64 + elapsed / 4_000).min(372) as u32;
            prop_assert_eq!(state.clicks, expected);
        }

        #[test]
        fn prop_reconcile_twice_is_idempotent(
            clicks in 0u32..=372,
            elapsed in 0u64..1_000_000,
        ) {
            let config = EconomyConfig::default();
            let mut state = GameState::new(&config, 0);
            state.clicks = clicks;
            reconcile_offline(&mut state, &config, elapsed);
            let once = state.clicks;
            reconcile_offline(&mut state, &config, elapsed);
            prop_assert_eq!(state.clicks, once);
        }
    }
}
