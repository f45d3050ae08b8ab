pub mod show;
pub mod train;
