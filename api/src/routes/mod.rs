pub mod chat;
pub mod landing_route;
