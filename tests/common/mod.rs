pub mod fake_qbittorrent;
pub mod fake_tracker;
pub mod logging;
pub mod wait;
