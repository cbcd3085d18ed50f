//! Pacing Engine — progression gating for serialized narrative generation.
//!
//! Consumes each candidate chapter together with the running story state,
//! quantifies relationship progress across four independent signal families,
//! rejects narrative moves outside the allowed progression band, and gates
//! milestone advancement one step at a time. The caller feeds the resulting
//! constraint set back into its content generator, closing the loop that
//! keeps a serial from declaring love before trust exists.

pub mod core;
pub mod schema;
