pub mod backup;
pub mod chart;
pub mod ledger;
pub mod record;
pub mod settings;
pub mod stats;
