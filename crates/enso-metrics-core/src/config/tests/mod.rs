mod default_tests;
mod file_tests;
mod validation_tests;
