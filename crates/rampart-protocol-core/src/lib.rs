pub mod codec;
pub mod diff;
pub mod encoder;
pub mod error;
pub mod lineage;
pub mod message;
pub mod opcode;
pub mod paging;
pub mod registry;
pub mod source;
pub mod state;
pub mod transport;
pub mod writer;

pub use codec::*;
pub use diff::*;
pub use encoder::{ConnectionBinding, Encoder};
pub use error::*;
pub use lineage::*;
pub use message::*;
pub use opcode::*;
pub use paging::*;
pub use registry::*;
pub use source::*;
pub use state::*;
pub use transport::*;
pub use writer::*;
