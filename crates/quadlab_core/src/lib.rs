pub mod batch;
pub mod command;
pub mod config;
pub mod session;
pub mod status;
pub mod time;
pub mod uniforms;

pub use batch::{Vertex, VertexBatch, VERTEX_CAPACITY};
pub use command::{Command, Key};
pub use config::{ConfigError, ResourceConfig, DEFAULT_CONFIG_PATH};
pub use session::{Flow, RenderHost, Session};
pub use status::{ExitStatus, PipelineStatus};
pub use time::{ScrubDirection, TimeState};
pub use uniforms::{ShaderUniforms, Uniform, UniformSet};
