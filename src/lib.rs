//! Visual editor core for wallet fund-flow contracts: a forest of wallets,
//! each carrying a nested tree of conditions and ranked exit routes.

pub mod canvas;
pub mod condition;
pub mod config;
pub mod editor;
pub mod error;
pub mod ids;
pub mod notify;
pub mod persist;
pub mod util;
pub mod validation;
pub mod wallet;

pub use editor::Editor;
pub use error::{Error, Result};
