pub mod fixtures;
pub mod install;

pub use install::TestInstall;
