/// Stable index of a storage position in `[0, capacity)`.
///
/// Slot ids are plain indices: they are shared between the slot dictionary,
/// the slot array and the recency list instead of pointers, so copying one
/// never keeps anything alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl From<SlotId> for usize {
    fn from(id: SlotId) -> Self {
        id.0
    }
}
