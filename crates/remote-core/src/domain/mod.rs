//! Domain layer: session state with no I/O.
//!
//! - **`state`** – The two small state enums the user interface renders.
//! - **`drag`** – The per-gesture throttle that turns a stream of pointer
//!   deltas into at most one `DRAG` frame per 10 ms.
//! - **`session_id`** – Monotonic identifiers that distinguish the live
//!   transport session from sessions that have already been replaced.

pub mod drag;
pub mod session_id;
pub mod state;
