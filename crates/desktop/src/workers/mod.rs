pub mod convert_worker;
