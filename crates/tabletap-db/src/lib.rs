//! # tabletap-db: Database Layer for TableTap
//!
//! This crate provides database access for the TableTap ordering platform.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       TableTap Data Flow                                │
//! │                                                                         │
//! │  Service call (cancel order, request payout)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   tabletap-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (order.rs,   │    │  (embedded)  │  │   │
//! │  │   │               │    │   balance.rs) │    │              │  │   │
//! │  │   │ SqlitePool    │    │ OrderRepo     │    │ 001_init.sql │  │   │
//! │  │   │ WAL mode      │◄───│ BalanceRepo   │    │ ...          │  │   │
//! │  │   │ Foreign keys  │    │ SettingsRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │            /var/lib/tabletap/tabletap.db                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (order, settings, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tabletap_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/tabletap.db");
//! let db = Database::new(config).await?;
//!
//! let order = db.orders().get_by_id(&order_id).await?;
//! let claimed = db.orders().cancel_if_active(&order_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::balance::BalanceRepository;
pub use repository::order::OrderRepository;
pub use repository::payment_link::PaymentLinkRepository;
pub use repository::settings::SettingsRepository;
