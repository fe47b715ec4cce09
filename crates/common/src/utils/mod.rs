/// String and byte-encoding utilities.
pub mod strings;
