mod error;
mod local_client;
mod service;

pub use error::DomainError;
pub use local_client::AuthRecordsLocalClient;
pub use service::Service;
