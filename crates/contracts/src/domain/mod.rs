pub mod a001_security_event;
