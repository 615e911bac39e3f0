mod disk;
mod health;

pub use disk::get_disk_stats;
pub use health::{handler_404, health};
