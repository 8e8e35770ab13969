pub mod dialogue;
pub mod overlay;
pub mod patrol;
