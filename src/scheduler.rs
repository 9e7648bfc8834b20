//! Cooperative recurring timers for click regen and passive income.
//!
//! The scheduler never reads the clock. The session feeds it epoch
//! milliseconds and drains due tasks one at a time, so every fire runs to
//! completion before the next one starts and tests can drive it with a
//! synthetic clock.

use std::collections::BTreeMap;

use crate::economy::ResourceKind;

/// Handle to one scheduled task. Cancelled handles are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// What a timer does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    ClickRegen,
    /// Passive income for the upgrade of this kind.
    Passive(ResourceKind),
}

#[derive(Clone, Debug)]
struct Entry {
    handle: TaskHandle,
    task: Task,
    interval_ms: u64,
    due_ms: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
    /// At most one live task per passive upgrade.
    passive: BTreeMap<ResourceKind, TaskHandle>,
    next_handle: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` every `interval_ms`, first fire one interval after `now_ms`.
    pub fn schedule_every(&mut self, task: Task, interval_ms: u64, now_ms: u64) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        // A zero interval would never let the drain loop finish.
        let interval_ms = interval_ms.max(1);
        self.entries.push(Entry {
            handle,
            task,
            interval_ms,
            due_ms: now_ms.saturating_add(interval_ms),
        });
        handle
    }

    /// Returns false if the handle was already gone.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.passive.retain(|_, h| *h != handle);
        self.entries.len() != before
    }

    /// Cancel any passive timer for `kind`, then start a fresh one.
    pub fn restart_passive(
        &mut self,
        kind: ResourceKind,
        interval_ms: u64,
        now_ms: u64,
    ) -> TaskHandle {
        if let Some(old) = self.passive.remove(&kind) {
            self.cancel(old);
        }
        let handle = self.schedule_every(Task::Passive(kind), interval_ms, now_ms);
        self.passive.insert(kind, handle);
        handle
    }

    /// Take the earliest task due at or before `now_ms` and reschedule it one
    /// interval later. Ties go to the task created first.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Task> {
        let entry = self
            .entries
            .iter_mut()
            .filter(|e| e.due_ms <= now_ms)
            .min_by_key(|e| (e.due_ms, e.handle))?;
        entry.due_ms = entry.due_ms.saturating_add(entry.interval_ms);
        Some(entry.task)
    }
}

#[cfg(test)]
impl Scheduler {
    pub fn passive_handle(&self, kind: ResourceKind) -> Option<TaskHandle> {
        self.passive.get(&kind).copied()
    }

    /// Number of live tasks running `task`.
    pub fn count(&self, task: Task) -> usize {
        self.entries.iter().filter(|e| e.task == task).count()
    }

    pub fn active_tasks(&self) -> usize {
        self.entries.len()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_ms).min()
    }
}
