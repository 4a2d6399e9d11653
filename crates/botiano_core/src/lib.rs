pub mod dispatch;
pub mod error;
pub mod event;
pub mod messages;
pub mod model;
pub mod reservations;
pub mod retrieval;
pub mod selection;
pub mod storage;
pub mod tokenize;

pub use dispatch::{Answer, Botiano, Reply, Response, SelectionOutcome};
pub use error::{Error, Result};
pub use event::{ChatEvent, Command, MessageEvent, SelectionEvent};
pub use model::{FaqEntry, Reservation, Suggestion};
pub use reservations::{
    ApiReservations, FileReservations, ReservationSource, format_reservations, split_message,
};
pub use retrieval::{TOP_K, direct_match, fallback_pattern, rank, top_k};
pub use selection::{
    ButtonRow, CORRELATION_PREFIX, SuggestionButton, correlation_id, parse_correlation_id,
    suggestion_rows,
};
pub use storage::{FaqStore, MemoryFaqStore, load_entries_jsonl};
pub use tokenize::tokenize;
