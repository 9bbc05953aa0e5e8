pub mod recency_list;
pub mod slot_dict;
pub mod slot_id;

pub use recency_list::{RecencyIter, RecencyList};
pub use slot_dict::AtomicSlotDict;
pub use slot_id::SlotId;
