//! Drag-to-reorder draft for projects.
//!
//! The draft is a full id sequence staged locally. It moves between three
//! states: `Clean` (shows canonical order), `Dirty` (holds unsaved moves)
//! and `Saving` (submitted, awaiting the server).

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::OrderAssignment;

/// Receiver of a complete `{id, order}` set.
#[async_trait]
pub trait ReorderTarget: Send + Sync {
    async fn submit_order(&self, assignments: Vec<OrderAssignment>) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftState {
    Clean,
    Dirty(Vec<Uuid>),
    Saving(Vec<Uuid>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderDraft {
    canonical: Vec<Uuid>,
    state: DraftState,
}

impl ReorderDraft {
    pub fn new(canonical: Vec<Uuid>) -> Self {
        Self {
            canonical,
            state: DraftState::Clean,
        }
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn canonical(&self) -> &[Uuid] {
        &self.canonical
    }

    /// The order to display: the draft if there is one, else canonical.
    pub fn order(&self) -> &[Uuid] {
        match &self.state {
            DraftState::Clean => &self.canonical,
            DraftState::Dirty(draft) | DraftState::Saving(draft) => draft,
        }
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.state, DraftState::Saving(_))
    }

    /// Element-wise comparison of the displayed order with canonical.
    pub fn has_changes(&self) -> bool {
        self.order() != self.canonical.as_slice()
    }

    /// Adopt a new canonical list. A pending draft drops ids removed
    /// upstream and appends new ones, keeping its relative order.
    pub fn reconcile(&mut self, canonical: Vec<Uuid>) {
        self.canonical = canonical;
        if let DraftState::Dirty(draft) = &mut self.state {
            draft.retain(|id| self.canonical.contains(id));
            for id in &self.canonical {
                if !draft.contains(id) {
                    draft.push(*id);
                }
            }
            if *draft == self.canonical {
                self.state = DraftState::Clean;
            }
        }
    }

    /// Move the item at `from` to position `to`. Returns false when either
    /// index is out of range or a save is in flight.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        let len = self.order().len();
        if self.is_saving() || from >= len || to >= len {
            return false;
        }

        let mut draft = self.order().to_vec();
        let id = draft.remove(from);
        draft.insert(to, id);
        self.state = if draft == self.canonical {
            DraftState::Clean
        } else {
            DraftState::Dirty(draft)
        };
        true
    }

    /// The displayed order as 1-based contiguous assignments.
    pub fn assignments(&self) -> Vec<OrderAssignment> {
        self.order()
            .iter()
            .enumerate()
            .map(|(index, id)| OrderAssignment {
                id: *id,
                order: index as i32 + 1,
            })
            .collect()
    }

    /// Submit the draft. On success the saved order becomes canonical and
    /// the draft is cleared; on failure the draft stays for a retry.
    /// Returns whether anything was submitted.
    pub async fn save(&mut self, target: &dyn ReorderTarget) -> anyhow::Result<bool> {
        let draft = match std::mem::replace(&mut self.state, DraftState::Clean) {
            DraftState::Dirty(draft) => draft,
            other => {
                self.state = other;
                return Ok(false);
            }
        };

        let assignments = draft
            .iter()
            .enumerate()
            .map(|(index, id)| OrderAssignment {
                id: *id,
                order: index as i32 + 1,
            })
            .collect();
        self.state = DraftState::Saving(draft);

        match target.submit_order(assignments).await {
            Ok(()) => {
                if let DraftState::Saving(saved) = std::mem::replace(&mut self.state, DraftState::Clean) {
                    self.canonical = saved;
                }
                Ok(true)
            }
            Err(e) => {
                if let DraftState::Saving(draft) = std::mem::replace(&mut self.state, DraftState::Clean) {
                    self.state = DraftState::Dirty(draft);
                }
                tracing::warn!(error = %e, "Reorder save failed");
                Err(e)
            }
        }
    }

    /// Discard the draft without contacting the server.
    pub fn reset(&mut self) {
        if !self.is_saving() {
            self.state = DraftState::Clean;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn ids(n: u128) -> Vec<Uuid> {
        (1..=n).map(Uuid::from_u128).collect()
    }

    #[derive(Default)]
    struct Recorder {
        submitted: Mutex<Vec<Vec<OrderAssignment>>>,
        fail: bool,
    }

    #[async_trait]
    impl ReorderTarget for Recorder {
        async fn submit_order(&self, assignments: Vec<OrderAssignment>) -> anyhow::Result<()> {
            self.submitted.lock().unwrap().push(assignments);
            if self.fail {
                anyhow::bail!("order 1 is assigned more than once");
            }
            Ok(())
        }
    }

    #[test]
    fn move_marks_dirty_and_back_is_clean() {
        let all = ids(3);
        let mut draft = ReorderDraft::new(all.clone());
        assert!(draft.move_item(2, 0));
        assert_eq!(draft.order(), [all[2], all[0], all[1]]);
        assert!(draft.has_changes());

        assert!(draft.move_item(0, 2));
        assert_eq!(draft.state(), &DraftState::Clean);
        assert!(!draft.has_changes());
        assert!(!draft.move_item(0, 3));
    }

    #[test]
    fn reconcile_drops_removed_and_appends_new() {
        let all = ids(4);
        let mut draft = ReorderDraft::new(all[..3].to_vec());
        draft.move_item(2, 0); // [3, 1, 2]

        draft.reconcile(vec![all[0], all[2], all[3]]); // 2 removed, 4 added
        assert_eq!(draft.order(), [all[2], all[0], all[3]]);
        assert!(draft.has_changes());
    }

    #[test]
    fn reconcile_to_matching_order_cleans() {
        let all = ids(2);
        let mut draft = ReorderDraft::new(all.clone());
        draft.move_item(1, 0);
        draft.reconcile(vec![all[1], all[0]]);
        assert_eq!(draft.state(), &DraftState::Clean);
    }

    #[test]
    fn assignments_are_contiguous_from_one() {
        let all = ids(3);
        let mut draft = ReorderDraft::new(all.clone());
        draft.move_item(2, 0);
        let orders: Vec<(Uuid, i32)> = draft.assignments().iter().map(|a| (a.id, a.order)).collect();
        assert_eq!(orders, [(all[2], 1), (all[0], 2), (all[1], 3)]);
    }

    #[tokio::test]
    async fn save_success_adopts_draft_as_canonical() {
        let all = ids(3);
        let mut draft = ReorderDraft::new(all.clone());
        let target = Recorder::default();

        assert!(!draft.save(&target).await.unwrap());
        assert!(target.submitted.lock().unwrap().is_empty());

        draft.move_item(2, 0);
        assert!(draft.save(&target).await.unwrap());
        assert_eq!(draft.state(), &DraftState::Clean);
        assert_eq!(draft.canonical(), [all[2], all[0], all[1]]);
        assert_eq!(target.submitted.lock().unwrap()[0].len(), 3);
    }

    #[tokio::test]
    async fn save_failure_keeps_draft() {
        let all = ids(2);
        let mut draft = ReorderDraft::new(all.clone());
        let target = Recorder {
            fail: true,
            ..Default::default()
        };
        draft.move_item(1, 0);
        assert!(draft.save(&target).await.is_err());
        assert_eq!(draft.state(), &DraftState::Dirty(vec![all[1], all[0]]));
        assert_eq!(draft.canonical(), all);

        draft.reset();
        assert_eq!(draft.order(), all);
    }
}
