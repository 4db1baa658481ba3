pub mod analytics_service;
pub mod backup_service;
pub mod chart_service;
pub mod ledger_service;
