pub mod action;
pub mod app;
pub mod document;
pub mod editor;
pub mod panic;
pub mod render;
pub mod session;
pub mod syntax;
pub mod view;
