pub mod history;
pub mod session;

pub use history::{delete_session_report, get_history, get_session_report, HistoryEntry};
pub use session::{finish_session, finish_session_with_source, SessionError, MIN_SESSION_SECONDS};
