use wasm_bindgen::prelude::*;

mod classroom;
mod comms;
mod lab;
mod office;
mod portfolio;

use portfolio::Portfolio;

room_web::export_room!(Portfolio, "pixel-portfolio");
