mod certificate_service_tests;
mod code_service_tests;
