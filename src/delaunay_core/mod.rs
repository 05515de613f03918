pub mod builder;
pub mod locate;
pub mod math;
pub mod mesh;
