//! Source orchestration.
//!
//! - `rotator`: failover across hosted search API credentials
//! - `aggregator`: concurrent fan-out over every adapter with per-adapter timeouts
//! - `report`: what each adapter did for one query

mod aggregator;
mod report;
mod rotator;

pub use aggregator::{one_per_site, AggregatedSearch, Aggregator, AggregatorConfig};
pub use report::{SearchReport, SourceOutcome, SourceReport};
pub use rotator::{CredentialRotator, RotatorState};
