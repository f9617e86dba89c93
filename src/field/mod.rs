pub mod editor;
pub mod format;
pub mod section;
pub mod smart;
