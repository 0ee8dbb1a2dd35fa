mod config;
mod continuation_table;
mod facade;
mod types;

pub use config::ContinuationTableConfig;
pub use facade::HistoryDataService;
pub use types::{
    HistoryReadRequest, HistoryReadResponse, HistoryReadResult, HistoryReadValueId, SessionId,
};
