pub mod gradient;
pub mod json;
pub mod jwt;
pub mod lorem;
