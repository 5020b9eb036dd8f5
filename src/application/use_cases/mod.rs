pub mod dataset_service;
pub mod record_loader;
