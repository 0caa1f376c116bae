pub mod error;
pub mod flow;
pub mod gate;
pub mod media;
pub mod navigation;
pub mod ports;
pub mod questionnaire;
pub mod store;
pub mod submission;
pub mod util;

pub type FlowResult<T> = Result<T, error::FlowError>;
