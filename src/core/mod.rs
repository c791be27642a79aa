pub mod dispatch;
pub mod orchestrator;
pub mod persister;
pub mod reporter;
pub mod validator;

pub use crate::domain::model::{BatchReport, DispatchOutcome, Record, StoredItem, Verdict};
pub use crate::domain::ports::{Dispatcher, Narrator, RecordSource, RecordStore, RecordTools, Storage};
pub use crate::utils::error::Result;
