//! # Repository Module
//!
//! Database repository implementations for TableTap.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service layer (tabletap-pay)                                          │
//! │       │                                                                 │
//! │       │  db.orders().cancel_if_active(order_id)                        │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── insert(&self, order, items)                                       │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── update_totals(&self, id, totals)                                  │
//! │  └── cancel_if_active(&self, id)                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Concurrency rule: anything two callers can race on (cancellation,    │
//! │  payout deduction, status advance) is a single conditional UPDATE      │
//! │  decided by rows_affected, never a read-then-write from memory.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`order::OrderRepository`] - Orders, items, status claims
//! - [`settings::SettingsRepository`] - Restaurant settings and fee rules
//! - [`payment_link::PaymentLinkRepository`] - Order-to-charge linkage
//! - [`balance::BalanceRepository`] - Vendor balances and payouts

pub mod balance;
pub mod order;
pub mod payment_link;
pub mod settings;
