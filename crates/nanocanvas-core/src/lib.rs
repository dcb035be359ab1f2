//! NanoCanvas Core Library
//!
//! Interaction core for the NanoCanvas AI image editor: scene model, viewport,
//! snapping, tools, style sync and the generation pipeline.

pub mod camera;
pub mod config;
pub mod editor;
pub mod events;
pub mod generation;
pub mod input;
pub mod project;
pub mod render_loop;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod storage;
pub mod templates;
pub mod tools;

use std::future::Future;
use std::pin::Pin;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

pub use camera::Camera;
pub use config::EditorConfig;
pub use editor::{
    AppState, Editor, GenerationOutput, PendingGeneration, Preset, generate, run_preset,
};
pub use events::{EditorEvent, EventBus, SubscriptionId};
pub use generation::{
    GenerationBackend, GenerationContext, GenerationError, GenerationMode, GenerationRequest,
    ImageResult, ModelId,
};
pub use input::{EditorKey, Modifiers, MouseButton, PointerEvent};
pub use project::{Gallery, GalleryItem, GalleryKind, ProjectRecord};
pub use scene::{Scene, SceneAdapter, SceneError, Selection};
pub use selection::{PropertyChange, SelectedProperties};
pub use shapes::{ObjectId, SerializableColor, Shape};
pub use snap::{GRID_SIZE, SNAP_DISTANCE, SnapConfig, SnapResult};
pub use storage::{MemoryStorage, ProjectStore, StorageError, StorageResult};
pub use tools::{ToolKind, ToolMachine, ToolState};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;

#[cfg(test)]
pub(crate) mod test_util {
    use std::future::Future;
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    /// Minimal executor for futures that never wait on I/O.
    pub fn block_on<F: Future>(f: F) -> F::Output {
        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
                return result;
            }
        }
    }
}
