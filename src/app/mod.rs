// Feedline - app/mod.rs
//
// Application layer: feed loading and memoised timeline state.
// Dependencies: core layer, util.
// Must NOT depend on: platform specifics.

pub mod feed;
pub mod state;
