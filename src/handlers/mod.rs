// handlers/mod.rs - HTTP surface, one module per resource
//
// Every handler here sits behind JWT validation and actor loading, so each
// receives an `Extension<Actor>` in addition to the shared `AppState`.

pub mod categories;
pub mod directory;
pub mod invoices;
pub mod jobcards;
