//! Back-office dashboard core
//!
//! Local live mirrors of the remote `orders` and `menu` tables, guarded
//! per-row mutations, and revenue analytics over the `analysis` table.
//!
//! # Module structure
//!
//! ```text
//! backoffice/src/
//! ├── core/          # Config, error, logging
//! ├── sync.rs        # Mirrored collection + delta broadcast
//! ├── gate.rs        # Per-row in-flight mutation gate
//! ├── orders.rs      # Live order board
//! ├── menu.rs        # Menu manager
//! ├── analytics.rs   # Revenue grouping and summary metrics
//! ├── revenue.rs     # Revenue history + per-day accumulation
//! ├── notice.rs      # Transient operator notices
//! └── dashboard.rs   # Wiring + feed event loop
//! ```

pub mod analytics;
pub mod core;
pub mod dashboard;
pub mod gate;
pub mod menu;
pub mod notice;
pub mod orders;
pub mod revenue;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public types
pub use crate::core::{AppError, AppResult, Config};
pub use dashboard::Dashboard;
pub use gate::{GateGuard, MutationGate};
pub use menu::{ItemForm, MenuFilter, MenuManager};
pub use notice::{Notice, NoticeCenter, NoticeLevel};
pub use orders::{MutationOutcome, OrderBoard};
pub use revenue::RevenueService;
pub use sync::{Collection, Delta, TableRow};

// Re-export logger functions
pub use crate::core::logger::init_logger_with_file;
