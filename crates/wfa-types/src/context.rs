//! The per-run context threaded through step execution.

use serde_json::{Map, Value};

/// A per-run mapping seeded with `payload` and extended with each
/// completed step's output under that step's name. Read-only from a
/// connector's point of view — the engine is the only writer.
pub type Context = Map<String, Value>;

/// Build the initial context for a run: `{"payload": <run payload>}`.
pub fn initial_context(payload: &Value) -> Context {
    let mut ctx = Map::new();
    ctx.insert("payload".to_string(), payload.clone());
    ctx
}
