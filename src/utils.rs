pub mod batch;
pub mod format;
pub mod runtime;
pub mod style;
pub mod table;
pub mod view;
