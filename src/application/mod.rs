pub mod use_cases;

pub use use_cases::dataset_service::DatasetService;
pub use use_cases::record_loader::RecordLoader;
