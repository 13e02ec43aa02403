pub mod batch;
pub mod capture;
pub mod frame;
pub mod gpu_context;
pub mod layouts;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use batch::{GpuVertexBatch, VERTEX_BUFFER_BYTES};
pub use capture::{CaptureError, CapturedFrame, Readback, SCREENSHOT_PATH};
pub use frame::{encode_frame, FrameDriver, FrameInputs};
pub use gpu_context::{GpuContext, GpuInitError};
pub use layouts::BindLayouts;
pub use shader::{ShaderError, ShaderPipeline};
pub use texture::{TextureError, TextureStage};
