pub mod todo;
pub mod ui;
