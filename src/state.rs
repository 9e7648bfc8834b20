/// 372 Pages runtime state and the read-only view handed to presenters.

use crate::economy::{EconomyConfig, PerKind, ResourceKind};

/// The single mutable aggregate of a session.
///
/// `clicks` stays inside `0..=max_clicks` through the clamp helpers below.
/// Resource and currency spending is validated by the caller in `logic`.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub clicks: u32,
    /// "372 Pages".
    pub currency: u64,
    pub resources: PerKind<u64>,
    pub upgrade_levels: PerKind<u64>,
    /// Epoch milliseconds of the last save.
    pub last_update_time: u64,
}

impl GameState {
    /// Fresh game: full click pool, nothing else.
    pub fn new(config: &EconomyConfig, now_ms: u64) -> Self {
        Self {
            clicks: config.max_clicks,
            currency: 0,
            resources: PerKind::default(),
            upgrade_levels: PerKind::default(),
            last_update_time: now_ms,
        }
    }

    /// Add clicks, stopping at the cap. Returns how many were actually added.
    pub fn add_clicks(&mut self, amount: u32, max_clicks: u32) -> u32 {
        let before = self.clicks.min(max_clicks);
        self.clicks = before.saturating_add(amount).min(max_clicks);
        self.clicks - before
    }

    /// Spend one click. Returns false (and changes nothing) when the pool is empty.
    pub fn spend_click(&mut self) -> bool {
        if self.clicks == 0 {
            return false;
        }
        self.clicks -= 1;
        true
    }

    pub fn clamp_clicks(&mut self, max_clicks: u32) {
        self.clicks = self.clicks.min(max_clicks);
    }

    /// Snapshot for rendering, including the button enable flags.
    pub fn view(&self, config: &EconomyConfig) -> GameStateView {
        let books = ResourceKind::all()
            .iter()
            .map(|&kind| {
                let conversion = config.conversion[kind];
                BookView {
                    kind,
                    resource: self.resources[kind],
                    conversion_cost: conversion.cost,
                    conversion_output: conversion.output,
                    can_read: self.clicks > 0,
                    can_convert: self.resources[kind] >= conversion.cost,
                }
            })
            .collect();

        let upgrades = ResourceKind::all()
            .iter()
            .map(|&kind| {
                let spec = config.upgrades[kind];
                UpgradeView {
                    kind,
                    level: self.upgrade_levels[kind],
                    cost: spec.cost,
                    affordable: self.currency >= spec.cost,
                    passive: spec.passive.is_some(),
                }
            })
            .collect();

        GameStateView {
            clicks: self.clicks,
            max_clicks: config.max_clicks,
            currency: self.currency,
            books,
            upgrades,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BookView {
    pub kind: ResourceKind,
    pub resource: u64,
    pub conversion_cost: u64,
    pub conversion_output: u64,
    pub can_read: bool,
    pub can_convert: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeView {
    pub kind: ResourceKind,
    pub level: u64,
    pub cost: u64,
    pub affordable: bool,
    /// Grants timed income rather than boosting clicks.
    pub passive: bool,
}

/// What a presenter gets after every mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct GameStateView {
    pub clicks: u32,
    pub max_clicks: u32,
    pub currency: u64,
    pub books: Vec<BookView>,
    pub upgrades: Vec<UpgradeView>,
}

#[cfg(test)]
impl GameStateView {
    pub fn book(&self, kind: ResourceKind) -> &BookView {
        &self.books[kind.index()]
    }

    pub fn upgrade(&self, kind: ResourceKind) -> &UpgradeView {
        &self.upgrades[kind.index()]
    }
}
