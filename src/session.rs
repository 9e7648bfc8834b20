//! One running game: state, timers, persistence and the presenter, wired together.
//!
//! Every entry point runs to completion on the caller's thread: intents from
//! the UI and timer fires from [`Session::advance`] never interleave.

use crate::actions::Intent;
use crate::clock::Clock;
use crate::console;
use crate::economy::{EconomyConfig, ResourceKind};
use crate::logic;
use crate::presenter::Presenter;
use crate::save::{LoadStatus, Persistence, LOAD_FAILED_NOTICE, SAVE_FAILED_NOTICE};
use crate::scheduler::{Scheduler, Task};
use crate::state::GameState;

pub struct Session {
    config: EconomyConfig,
    state: GameState,
    scheduler: Scheduler,
    persistence: Persistence,
    presenter: Box<dyn Presenter>,
    clock: Box<dyn Clock>,
    /// Set while saves keep failing, so the player is told once per streak.
    save_failing: bool,
}

impl Session {
    /// Load (or create) the game, start the click-regen timer and a passive
    /// timer for every passive upgrade already owned, then render.
    pub fn start(
        config: EconomyConfig,
        mut persistence: Persistence,
        presenter: Box<dyn Presenter>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let now = clock.now_ms();
        let loaded = persistence.load(&config, now);

        let mut scheduler = Scheduler::new();
        scheduler.schedule_every(Task::ClickRegen, config.regen_interval_ms, now);
        for &kind in ResourceKind::all() {
            if loaded.state.upgrade_levels[kind] > 0 {
                if let Some(passive) = config.passive(kind) {
                    scheduler.restart_passive(kind, passive.interval_ms, now);
                }
            }
        }

        let mut session = Self {
            config,
            state: loaded.state,
            scheduler,
            persistence,
            presenter,
            clock,
            save_failing: loaded.saved.is_err(),
        };

        match &loaded.status {
            LoadStatus::Fresh => console::log("新規ゲームを開始"),
            LoadStatus::Restored {
                offline_clicks,
                legacy,
            } => {
                if *legacy {
                    console::log("旧形式のセーブデータを変換しました");
                }
                if *offline_clicks > 0 {
                    console::log(&format!("オフライン中に {offline_clicks} クリック回復"));
                }
            }
            LoadStatus::Recovered(e) => {
                console::warn(&format!("セーブデータの読み込みに失敗（新規ゲームを開始）: {e}"));
                session.presenter.notify(LOAD_FAILED_NOTICE);
            }
        }
        if session.save_failing {
            session.presenter.notify(SAVE_FAILED_NOTICE);
        }
        session.refresh();
        session
    }

    #[cfg(test)]
    pub fn view(&self) -> crate::state::GameStateView {
        self.state.view(&self.config)
    }

    #[cfg(test)]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Route a UI intent. `DismissNotice` is the UI's own business.
    pub fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::Read(kind) => self.on_read(kind),
            Intent::Convert(kind) => self.on_convert(kind),
            Intent::BuyUpgrade(kind) => self.on_buy_upgrade(kind),
            Intent::DismissNotice => {}
        }
    }

    pub fn on_read(&mut self, kind: ResourceKind) {
        if let Err(e) = logic::read(&mut self.state, &self.config, kind) {
            self.presenter.notify(&e.to_string());
        }
        self.refresh();
    }

    pub fn on_convert(&mut self, kind: ResourceKind) {
        match logic::convert(&mut self.state, &self.config, kind) {
            Ok(receipt) => self.presenter.notify(&receipt.to_string()),
            Err(e) => self.presenter.notify(&e.to_string()),
        }
        self.refresh();
    }

    /// On success the notice and render go out first, then the passive
    /// timer (if any) restarts from now.
    pub fn on_buy_upgrade(&mut self, kind: ResourceKind) {
        match logic::buy_upgrade(&mut self.state, &self.config, kind) {
            Ok(purchase) => {
                console::log(&format!(
                    "{} upgrade Lv{} (-{} Pages)",
                    purchase.kind, purchase.level, purchase.cost
                ));
                self.presenter.notify(&purchase.to_string());
                self.refresh();
                if let Some(passive) = purchase.passive {
                    let now = self.clock.now_ms();
                    self.scheduler.restart_passive(kind, passive.interval_ms, now);
                }
            }
            Err(e) => {
                self.presenter.notify(&e.to_string());
                self.refresh();
            }
        }
    }

    /// Run every timer fire that is due, oldest first. Missed periods are
    /// caught up one fire at a time; the batch ends with one render+save.
    /// Returns the number of fires.
    ///
    /// A stall with the page still open (hidden tab, system sleep) therefore
    /// pays every missed passive fire. A reload does not: `Persistence::load`
    /// only credits clicks, so the same absence earns no passive income.
    pub fn advance(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut fired = 0;
        while let Some(task) = self.scheduler.pop_due(now) {
            match task {
                Task::ClickRegen => {
                    logic::regen_tick(&mut self.state, &self.config);
                }
                Task::Passive(kind) => {
                    logic::passive_tick(&mut self.state, &self.config, kind);
                }
            }
            fired += 1;
        }
        if fired > 0 {
            self.refresh();
        }
        fired
    }

    /// Render, then save. A failing save is reported once per failure streak.
    fn refresh(&mut self) {
        let view = self.state.view(&self.config);
        self.presenter.render(&view);

        let now = self.clock.now_ms();
        match self.persistence.save(&mut self.state, now) {
            Ok(()) => {
                if self.save_failing {
                    console::log("保存が復旧しました");
                }
                self.save_failing = false;
            }
            Err(_) if self.save_failing => {}
            Err(_) => {
                self.save_failing = true;
                self.presenter.notify(SAVE_FAILED_NOTICE);
            }
        }
    }
}
