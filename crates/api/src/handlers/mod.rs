pub mod assets;
pub mod insights;
pub mod recommendations;
