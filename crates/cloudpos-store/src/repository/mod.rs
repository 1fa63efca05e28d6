//! # Repository Layer
//!
//! Repositories wrap SQL access behind typed async methods.
//!
//! ## Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Repository Pattern                                 │
//! │                                                                         │
//! │  LocalStore                                                             │
//! │      │                                                                  │
//! │      ├── pending_sales() ──► PendingSaleRepository                      │
//! │      │                        put / list_unsynced / mark_synced         │
//! │      │                                                                  │
//! │      └── products() ───────► ProductCacheRepository                     │
//! │                               replace_all / list_for_store / delete     │
//! │                                                                         │
//! │  Each repository holds a clone of the pool (cheap, ref-counted) and     │
//! │  maps rows to cloudpos-core domain types at the boundary.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod pending_sale;
pub mod product;
