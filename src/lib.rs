pub mod custody;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod index;
pub mod ledger;
pub mod registry;
pub mod types;

// re-export key types
pub use custody::{CollateralGateway, CustodyError, InMemoryGateway};
pub use decimal::{DebtIndex, Money, ScaledDebt};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use index::CollateralIndex;
pub use ledger::LoanLedger;
pub use registry::{Loan, LoanRegistry};
pub use types::{Address, AuctionBid, CollateralKey, LoanId, LoanState, TokenId, NO_LOAN};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
