// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod error;
pub mod ids;
pub mod model;
pub mod preselect;
pub mod selection;
pub mod session;
pub mod source;
pub mod state;

pub use error::*;
pub use ids::*;
pub use model::*;
pub use preselect::{PreselectOutcome, PreselectStop, collect_first};
pub use selection::*;
pub use session::*;
pub use source::*;
pub use state::*;
