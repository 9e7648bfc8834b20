//! Player intents and the keys that trigger them.
//!
//! Render registers the same `Intent` values as tap targets, so a tap and a
//! key press on the same row always dispatch the same thing.

use crate::economy::ResourceKind;

/// Keys for reading each book, in `ResourceKind::all()` order.
const READ_KEYS: [char; 4] = ['1', '2', '3', '4'];
const CONVERT_KEYS: [char; 4] = ['q', 'w', 'e', 'r'];
const UPGRADE_KEYS: [char; 4] = ['a', 's', 'd', 'f'];
/// Closes the notice modal. Esc and Enter do the same.
pub const DISMISS_KEY: char = 'x';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Read(ResourceKind),
    Convert(ResourceKind),
    BuyUpgrade(ResourceKind),
    DismissNotice,
}

impl Intent {
    pub fn from_key(key: char) -> Option<Intent> {
        let key = key.to_ascii_lowercase();
        if key == DISMISS_KEY {
            return Some(Intent::DismissNotice);
        }
        let lookup = |keys: &[char; 4]| {
            keys.iter()
                .position(|k| *k == key)
                .map(|i| ResourceKind::all()[i])
        };
        lookup(&READ_KEYS)
            .map(Intent::Read)
            .or_else(|| lookup(&CONVERT_KEYS).map(Intent::Convert))
            .or_else(|| lookup(&UPGRADE_KEYS).map(Intent::BuyUpgrade))
    }

    pub fn key(&self) -> char {
        match self {
            Intent::Read(kind) => READ_KEYS[kind.index()],
            Intent::Convert(kind) => CONVERT_KEYS[kind.index()],
            Intent::BuyUpgrade(kind) => UPGRADE_KEYS[kind.index()],
            Intent::DismissNotice => DISMISS_KEY,
        }
    }

    /// `[Q]`-style label for the key, as drawn next to a button.
    pub fn key_label(&self) -> String {
        format!("[{}]", self.key().to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_intent_roundtrips_through_its_key() {
        for &kind in ResourceKind::all() {
            for intent in [Intent::Read(kind), Intent::Convert(kind), Intent::BuyUpgrade(kind)] {
                assert_eq!(Intent::from_key(intent.key()), Some(intent));
            }
        }
        assert_eq!(Intent::from_key('x'), Some(Intent::DismissNotice));
    }

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<char> = READ_KEYS
            .iter()
            .chain(CONVERT_KEYS.iter())
            .chain(UPGRADE_KEYS.iter())
            .copied()
            .collect();
        keys.push(DISMISS_KEY);
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[test]
    fn uppercase_keys_work() {
        assert_eq!(Intent::from_key('Q'), Some(Intent::Convert(ResourceKind::Rp1)));
        assert_eq!(Intent::from_key('F'), Some(Intent::BuyUpgrade(ResourceKind::UglyLove)));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(Intent::from_key('z'), None);
        assert_eq!(Intent::from_key('5'), None);
    }

    #[test]
    fn key_label_is_bracketed_uppercase() {
        assert_eq!(Intent::Convert(ResourceKind::EyeOfArgon).key_label(), "[E]");
        assert_eq!(Intent::Read(ResourceKind::Armada).key_label(), "[2]");
    }
}
