mod image;
mod notice;
mod upload;

pub use image::*;
pub use notice::*;
pub use upload::*;
