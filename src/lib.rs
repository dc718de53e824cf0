// Webmark: image preparation for web publication

pub mod codec;
pub mod config;
pub mod logging;
pub mod metadata;
pub mod watermark;
