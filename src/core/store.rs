use std::collections::HashMap;

/// A status transition observed between two polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub id: String,
    pub from: String,
    pub to: String,
}

/// Last-seen statuses for one watched resource, keyed by backend id.
///
/// This is the caller-side half of the polling contract: the controller
/// stays generic over any callback, and the "did anything change since last
/// time" comparison lives here, next to the state it compares against.
#[derive(Debug, Default)]
pub struct StatusBoard {
    seen: HashMap<String, String>,
    seeded: bool,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a fresh snapshot into the board and report transitions.
    ///
    /// The first snapshot only seeds the baseline and reports nothing, as
    /// does an entry appearing for the first time; only a changed status of
    /// an already-tracked entry is a transition. Entries missing from the
    /// snapshot are dropped from the baseline.
    pub fn apply(&mut self, fresh: Vec<(String, String)>) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        let mut next: HashMap<String, String> = HashMap::with_capacity(fresh.len());

        for (id, status) in fresh {
            if self.seeded {
                if let Some(previous) = self.seen.get(&id) {
                    if *previous != status {
                        changes.push(StatusChange {
                            id: id.clone(),
                            from: previous.clone(),
                            to: status.clone(),
                        });
                    }
                }
            }
            next.insert(id, status);
        }

        self.seen = next;
        self.seeded = true;
        changes
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[allow(dead_code)]
    pub fn status_of(&self, id: &str) -> Option<&str> {
        self.seen.get(id).map(String::as_str)
    }
}
