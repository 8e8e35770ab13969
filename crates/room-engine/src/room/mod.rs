pub mod controller;

pub use controller::RoomController;
