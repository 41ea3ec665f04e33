//! # Route handlers
//!
//! | Path | Module | Auth |
//! |---|---|---|
//! | `/cards`, `/card/*`, `/wallet/balance` | [`cards`] | yes |
//! | `/healthz`, `/external_health` | [`health`] | no |

pub mod cards;
pub mod health;
