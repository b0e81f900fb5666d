pub mod account;
pub mod block;
pub mod command;
pub mod dataview;
pub mod event;
pub mod message;
pub mod process;

pub use account::*;
pub use block::*;
pub use command::*;
pub use dataview::*;
pub use event::*;
pub use message::*;
pub use process::*;
