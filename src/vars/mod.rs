//! Variables and `$(NAME:option)` template expansion.
//!
//! A [`VariableStore`] maps names to one or more values. An [`Interpolator`]
//! expands template strings against any [`Lookup`] (a store, or a [`Scope`]
//! layered on top of one).
//!
//! ## Example
//!
//! ```rust
//! use ccode::diag::Silent;
//! use ccode::vars::{Interpolator, VariableStore};
//!
//! let mut vars = VariableStore::new();
//! vars.set("INCLUDES", ["include", "vendor/fmt/include"]);
//!
//! let ix = Interpolator::new(&vars, &Silent);
//! assert_eq!(ix.resolve("$(INCLUDES:p-I:j )"), vec!["-Iinclude -Ivendor/fmt/include"]);
//! ```

mod interpolate;
mod options;
mod store;

pub use interpolate::Interpolator;
pub use options::Opt;
pub use store::{Lookup, Scope, VariableStore};
