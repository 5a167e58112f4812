pub mod confirm;
pub mod form;
pub mod grid;
pub mod hints;
pub mod tabs;
pub mod toast;
