//! Application services: request validation, commit, and the inbound desk.

mod commit;
mod desk;
mod validator;

pub use commit::{CommitExecutor, CommitReceipt, OverflowAnomaly};
pub use desk::{
    ConfirmOutcome, ExpiryReport, RequestOutcome, TradeDesk, TradeDeskError, TradeDeskResult,
};
pub use validator::{RequestRejection, TradeValidator};
