pub mod batch_result;
pub mod convert_batch_use_case;
pub mod progress_event;
