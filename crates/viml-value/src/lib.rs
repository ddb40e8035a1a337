//! Dynamic value model for the legacy editor script language.
//!
//! Values are Numbers, Floats, Strings, Lists, Dictionaries, Funcrefs and
//! the specials `v:true`/`v:false`/`v:null`. Lists and dictionaries live in
//! a [`Heap`] and are shared by reference: putting a container into another
//! slot aliases it (see [`Heap::alias`]); only [`Heap::copy`] duplicates
//! storage.
//!
//! The translator never runs this code. It is the contract the generated
//! code and the host runtime agree on, and it owns the catalog of legacy
//! error messages ([`LegacyError`]) that the parser and translator embed.

mod convert;
mod copy;
mod equal;
mod errors;
mod gc;
mod heap;
pub mod number;
mod value;

pub use convert::format_float;
pub use copy::MAX_COPY_DEPTH;
pub use equal::{EQUAL_RECURSION_LIMIT, EqualBudget};
pub use errors::{LegacyError, ValueError};
pub use heap::{DictId, Heap, ListId};
pub use value::{Special, Value, ValueType};

#[cfg(test)]
mod tests;
