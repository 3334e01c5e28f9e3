pub mod bar;
pub mod model;
pub mod popup;
pub mod screen;
