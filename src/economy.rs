/// 372 Pages economy: the four books and the fixed numbers that drive them.
///
/// Everything here is plain data. Game logic reads an `EconomyConfig` and
/// never mutates it; tests swap in cheaper economies with struct update
/// syntax.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Max clicks, and the clicks granted to a brand new game.
pub const MAX_CLICKS: u32 = 372;
/// One click comes back every 4 seconds.
pub const CLICK_REGEN_INTERVAL_MS: u64 = 4_000;
pub const CLICKS_PER_REGEN_TICK: u32 = 1;

/// The four books. Each one is a resource pool and, 1:1, an upgrade line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Rp1,
    Armada,
    EyeOfArgon,
    UglyLove,
}

impl ResourceKind {
    /// All books in display order.
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Rp1,
            ResourceKind::Armada,
            ResourceKind::EyeOfArgon,
            ResourceKind::UglyLove,
        ]
    }

    /// Stable identifier, also used in save records and notices.
    pub fn id(&self) -> &'static str {
        match self {
            ResourceKind::Rp1 => "rp1",
            ResourceKind::Armada => "armada",
            ResourceKind::EyeOfArgon => "eyeofargon",
            ResourceKind::UglyLove => "uglylove",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ResourceKind::Rp1 => "Ready Player One",
            ResourceKind::Armada => "Armada",
            ResourceKind::EyeOfArgon => "The Eye of Argon",
            ResourceKind::UglyLove => "Ugly Love",
        }
    }

    /// What reading this book produces.
    pub fn resource_name(&self) -> &'static str {
        match self {
            ResourceKind::Rp1 => "80s Nostalgia Bits",
            ResourceKind::Armada => "Gamer Logic Bytes",
            ResourceKind::EyeOfArgon => "Purple Prose Blobs",
            ResourceKind::UglyLove => "Troubled Romance Tokens",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ResourceKind::Rp1 => 0,
            ResourceKind::Armada => 1,
            ResourceKind::EyeOfArgon => 2,
            ResourceKind::UglyLove => 3,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One value per book. Serializes as `{ "rp1": .., "armada": .., .. }`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerKind<T> {
    pub rp1: T,
    pub armada: T,
    pub eyeofargon: T,
    pub uglylove: T,
}

impl<T: Copy> PerKind<T> {
    pub fn splat(value: T) -> Self {
        Self {
            rp1: value,
            armada: value,
            eyeofargon: value,
            uglylove: value,
        }
    }
}

impl<T> Index<ResourceKind> for PerKind<T> {
    type Output = T;

    fn index(&self, kind: ResourceKind) -> &T {
        match kind {
            ResourceKind::Rp1 => &self.rp1,
            ResourceKind::Armada => &self.armada,
            ResourceKind::EyeOfArgon => &self.eyeofargon,
            ResourceKind::UglyLove => &self.uglylove,
        }
    }
}

impl<T> IndexMut<ResourceKind> for PerKind<T> {
    fn index_mut(&mut self, kind: ResourceKind) -> &mut T {
        match kind {
            ResourceKind::Rp1 => &mut self.rp1,
            ResourceKind::Armada => &mut self.armada,
            ResourceKind::EyeOfArgon => &mut self.eyeofargon,
            ResourceKind::UglyLove => &mut self.uglylove,
        }
    }
}

/// Resource units consumed per conversion, and 372 Pages produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConversionRate {
    pub cost: u64,
    pub output: u64,
}

/// Recurring resource grant unlocked by owning an upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassiveIncome {
    /// Granted per upgrade level on every fire.
    pub rate: u64,
    pub interval_ms: u64,
    /// Resource pool that receives the grant.
    pub target: ResourceKind,
}

/// An upgrade line. `effect` boosts per-click yield; `passive` adds timed income.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpgradeSpec {
    /// 372 Pages per level.
    pub cost: u64,
    pub effect: Option<u64>,
    pub passive: Option<PassiveIncome>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EconomyConfig {
    pub max_clicks: u32,
    pub regen_interval_ms: u64,
    pub regen_per_tick: u32,
    /// Yield per read before upgrades.
    pub base_rate: PerKind<u64>,
    pub conversion: PerKind<ConversionRate>,
    pub upgrades: PerKind<UpgradeSpec>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            max_clicks: MAX_CLICKS,
            regen_interval_ms: CLICK_REGEN_INTERVAL_MS,
            regen_per_tick: CLICKS_PER_REGEN_TICK,
            base_rate: PerKind::splat(1),
            conversion: PerKind {
                rp1: ConversionRate { cost: 10, output: 1 },
                armada: ConversionRate { cost: 15, output: 1 },
                eyeofargon: ConversionRate { cost: 5, output: 1 },
                uglylove: ConversionRate { cost: 20, output: 1 },
            },
            upgrades: PerKind {
                rp1: UpgradeSpec {
                    cost: 10,
                    effect: Some(1),
                    passive: None,
                },
                armada: UpgradeSpec {
                    cost: 50,
                    effect: None,
                    passive: Some(PassiveIncome {
                        rate: 1,
                        interval_ms: 5_000,
                        target: ResourceKind::Armada,
                    }),
                },
                eyeofargon: UpgradeSpec {
                    cost: 15,
                    effect: Some(1),
                    passive: None,
                },
                uglylove: UpgradeSpec {
                    cost: 75,
                    effect: None,
                    passive: Some(PassiveIncome {
                        rate: 1,
                        interval_ms: 10_000,
                        target: ResourceKind::UglyLove,
                    }),
                },
            },
        }
    }
}

impl EconomyConfig {
    /// Resources gained by one read of `kind` at the given upgrade level.
    pub fn read_yield(&self, kind: ResourceKind, level: u64) -> u64 {
        let bonus = self.upgrades[kind]
            .effect
            .map_or(0, |effect| level.saturating_mul(effect));
        self.base_rate[kind].saturating_add(bonus)
    }

    /// Passive upgrades that need a running timer at this level.
    pub fn passive(&self, kind: ResourceKind) -> Option<PassiveIncome> {
        self.upgrades[kind].passive.filter(|p| p.interval_ms > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_economy_constants() {
        let config = EconomyConfig::default();
        assert_eq!(config.max_clicks, 372);
        assert_eq!(config.regen_interval_ms, 4000);
        assert_eq!(config.regen_per_tick, 1);
        assert_eq!(config.conversion[ResourceKind::EyeOfArgon].cost, 5);
        assert_eq!(config.conversion[ResourceKind::UglyLove].cost, 20);
        assert_eq!(config.upgrades[ResourceKind::Armada].cost, 50);
    }

    #[test]
    fn only_armada_and_uglylove_are_passive() {
        let config = EconomyConfig::default();
        let passive: Vec<ResourceKind> = ResourceKind::all()
            .iter()
            .copied()
            .filter(|k| config.passive(*k).is_some())
            .collect();
        assert_eq!(passive, vec![ResourceKind::Armada, ResourceKind::UglyLove]);
    }

    #[test]
    fn read_yield_adds_effect_per_level() {
        let config = EconomyConfig::default();
        assert_eq!(config.read_yield(ResourceKind::Rp1, 0), 1);
        assert_eq!(config.read_yield(ResourceKind::Rp1, 2), 3);
        // Armada has no click effect: levels do not change the yield.
        assert_eq!(config.read_yield(ResourceKind::Armada, 5), 1);
    }

    #[test]
    fn zero_interval_passive_is_ignored() {
        let mut config = EconomyConfig::default();
        config.upgrades.armada.passive = Some(PassiveIncome {
            rate: 1,
            interval_ms: 0,
            target: ResourceKind::Armada,
        });
        assert!(config.passive(ResourceKind::Armada).is_none());
    }

    #[test]
    fn per_kind_index_matches_fields() {
        let mut values = PerKind::splat(0u64);
        values[ResourceKind::EyeOfArgon] = 7;
        assert_eq!(values.eyeofargon, 7);
        values[ResourceKind::Rp1] += 2;
        assert_eq!(values, PerKind { rp1: 2, armada: 0, eyeofargon: 7, uglylove: 0 });
    }

    #[test]
    fn kind_ids_roundtrip_through_serde() {
        for kind in ResourceKind::all() {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.id()));
            let back: ResourceKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, *kind);
        }
    }

    #[test]
    fn indices_follow_display_order() {
        for (i, kind) in ResourceKind::all().iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
