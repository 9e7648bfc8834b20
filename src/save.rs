//! 372 Pages セーブ/ロード機能。
//!
//! ## バージョニング方針
//!
//! - `SAVE_VERSION`: 現在のセーブ形式バージョン。フィールド追加時にインクリメントする。
//! - `MIN_COMPATIBLE_VERSION`: 互換性を維持できる最小バージョン。
//!   新フィールドの追加のみの場合はこの値を変えない（旧データを維持できる）。
//!   既存フィールドの意味変更や削除など破壊的変更を行った場合のみインクリメントする。
//!
//! バージョン情報を持たない旧形式（JS 版が `localStorage` に書いた
//! `currentClicks` / `total372Pages` 形式）もそのまま読み込む。
//!
//! ## オフライン回復
//!
//! ロード時に `lastUpdateTime` からの経過時間でクリックを回復させる。
//! パッシブ収入はオフライン中には発生しない。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::console;
use crate::economy::{EconomyConfig, PerKind};
use crate::logic;
use crate::state::GameState;
use crate::storage::{KeyValueStore, StorageError};

/// セーブデータのフォーマットバージョン。
const SAVE_VERSION: u32 = 1;

/// 互換性を維持できる最小バージョン。
const MIN_COMPATIBLE_VERSION: u32 = 1;

/// localStorage のキー。JS 版と同じキーを使う。
pub const STORAGE_KEY: &str = "372pagesGame";

pub const SAVE_FAILED_NOTICE: &str =
    "Error saving game! Please ensure your browser allows local storage.";
pub const LOAD_FAILED_NOTICE: &str = "Error loading game! Starting a new game.";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("save record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("save version {saved} is older than the minimum compatible version {min}")]
    Incompatible { saved: u32, min: u32 },
}

/// シリアライズ用のセーブデータ構造体。
#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    game: GameSave,
}

/// 欠けたフィールドは不正扱いせず、デフォルト値で補完する。
#[derive(Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct GameSave {
    /// 負の値や上限超えはロード後に丸める。`None` は満タン扱い。
    #[serde(alias = "currentClicks")]
    clicks: Option<i64>,
    #[serde(alias = "total372Pages")]
    currency: u64,
    resources: PerKind<u64>,
    upgrade_levels: PerKind<u64>,
    /// エポックミリ秒。`None` は「今」扱い（経過時間ゼロ）。
    last_update_time: Option<u64>,
}

/// GameState からセーブ用データを抽出する。
fn extract_save(state: &GameState) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        game: GameSave {
            clicks: Some(i64::from(state.clicks)),
            currency: state.currency,
            resources: state.resources,
            upgrade_levels: state.upgrade_levels,
            last_update_time: Some(state.last_update_time),
        },
    }
}

/// セーブデータを GameState に復元する。クリック数は `[0, max_clicks]` に丸める。
fn apply_save(save: &GameSave, config: &EconomyConfig, now_ms: u64) -> GameState {
    let max = i64::from(config.max_clicks);
    let clicks = save.clicks.unwrap_or(max).clamp(0, max) as u32;
    GameState {
        clicks,
        currency: save.currency,
        resources: save.resources,
        upgrade_levels: save.upgrade_levels,
        last_update_time: save.last_update_time.unwrap_or(now_ms),
    }
}

/// JSON を読み、現行形式なら保存時のバージョンも返す。
/// `version` キーが無いものは JS 版の旧形式として読む。
fn decode(json: &str) -> Result<(GameSave, Option<u32>), SaveError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("version").is_none() {
        return Ok((serde_json::from_value(value)?, None));
    }
    let data: SaveData = serde_json::from_value(value)?;
    if data.version < MIN_COMPATIBLE_VERSION {
        return Err(SaveError::Incompatible {
            saved: data.version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    Ok((data.game, Some(data.version)))
}

/// ロード結果の内訳。
#[derive(Debug)]
pub enum LoadStatus {
    /// セーブが無かったので新規ゲーム。
    Fresh,
    /// セーブから復元した。
    Restored {
        offline_clicks: u32,
        /// 旧形式（バージョン無し）から読み込んだ。
        legacy: bool,
    },
    /// 読み込みに失敗したので新規ゲームで再開した。
    Recovered(SaveError),
}

#[derive(Debug)]
pub struct Loaded {
    pub state: GameState,
    pub status: LoadStatus,
    /// ロード直後の書き戻しの結果。
    pub saved: Result<(), SaveError>,
}

/// GameState と永続ストアの橋渡し。
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl Persistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: Box<dyn KeyValueStore>, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }

    /// `lastUpdateTime` を `now_ms` に更新してから書き込む。
    /// 失敗してもメモリ上の状態はそのまま使える。
    pub fn save(&mut self, state: &mut GameState, now_ms: u64) -> Result<(), SaveError> {
        state.last_update_time = now_ms;
        let json = serde_json::to_string(&extract_save(state))?;
        self.store.set(&self.key, &json).map_err(|e| {
            console::warn(&format!("localStorage への保存に失敗: {e}"));
            SaveError::from(e)
        })
    }

    /// ストアから復元し、オフライン中のクリック回復を反映して書き戻す。
    /// どんな失敗でも新規ゲームで再開し、エラーは `LoadStatus` で返す。
    pub fn load(&mut self, config: &EconomyConfig, now_ms: u64) -> Loaded {
        let (mut state, status) = match self.read(config, now_ms) {
            Ok(Some((state, status))) => (state, status),
            Ok(None) => (GameState::new(config, now_ms), LoadStatus::Fresh),
            Err(e) => {
                if matches!(e, SaveError::Corrupt(_) | SaveError::Incompatible { .. }) {
                    // 壊れたデータを削除
                    let _ = self.store.remove(&self.key);
                }
                (GameState::new(config, now_ms), LoadStatus::Recovered(e))
            }
        };
        state.clamp_clicks(config.max_clicks);
        let saved = self.save(&mut state, now_ms);
        Loaded {
            state,
            status,
            saved,
        }
    }

    fn read(
        &self,
        config: &EconomyConfig,
        now_ms: u64,
    ) -> Result<Option<(GameState, LoadStatus)>, SaveError> {
        let Some(json) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        let (save, version) = decode(&json)?;
        if let Some(v) = version.filter(|v| *v < SAVE_VERSION) {
            console::log(&format!(
                "旧バージョンのセーブデータをマイグレーション (saved={v}, current={SAVE_VERSION})"
            ));
        }
        let mut state = apply_save(&save, config, now_ms);
        let offline_clicks = logic::reconcile_offline(&mut state, config, now_ms);
        Ok(Some((
            state,
            LoadStatus::Restored {
                offline_clicks,
                legacy: version.is_none(),
            },
        )))
    }
}
