//! Typed bindings of the embedded forms and their semantic checks.
//!
//! Bindings cover only the fields the checks read. Checks never fail a
//! request; their findings are logged.

pub mod common;
pub mod correspondence;
pub mod ep2pg;
pub mod lp1f;
pub mod lp1h;
pub mod lp2;
pub mod lpa115;
pub mod lpa116;
pub mod lpa120;
pub mod lpc;

pub use common::{Address, Flag, FormCheck, Signed, Witness};
pub use correspondence::Correspondence;
pub use ep2pg::Ep2pg;
pub use lp1f::Lp1f;
pub use lp1h::Lp1h;
pub use lp2::Lp2;
pub use lpa115::Lpa115;
pub use lpa116::Lpa116;
pub use lpa120::Lpa120;
pub use lpc::Lpc;
