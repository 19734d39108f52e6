pub mod recorder;
pub mod wav;

pub use recorder::{AudioRecorder, CaptureError, concat_fragments};
pub use wav::encode_wav_mono16;
