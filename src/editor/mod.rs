pub mod selection;
pub mod session;

pub use selection::Selection;
pub use session::{EditorEvent, EditorSession};
