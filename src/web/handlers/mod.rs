pub mod grid_handlers;
pub mod job_handlers;
pub mod pipeline_handlers;
pub mod resume_handlers;
pub mod system_handlers;

pub use grid_handlers::*;
pub use job_handlers::*;
pub use pipeline_handlers::*;
pub use resume_handlers::*;
pub use system_handlers::*;
