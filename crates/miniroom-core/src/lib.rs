pub mod assets;
pub mod camera;
pub mod collision;
pub mod constants;
pub mod editor;
pub mod error;
pub mod layout;
pub mod orientation;
pub mod overrides;
pub mod placement;
pub mod room;
pub mod snap;
pub mod storage;

pub use assets::*;
pub use camera::*;
pub use collision::*;
pub use editor::*;
pub use error::*;
pub use layout::*;
pub use orientation::*;
pub use overrides::*;
pub use placement::*;
pub use room::*;
pub use snap::*;
pub use storage::*;
