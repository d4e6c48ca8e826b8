pub mod console_service;
