//! MDP Link
//!
//! Client library for the Modular Device Profile (MDP) of industrial
//! device-management targets. It adapts a raw index-group/index-offset
//! transport into structured parameter access:
//!
//! - [`address`] - Structured addresses and the packed 32-bit offset codec
//! - [`netid`] - `AmsNetId` target addresses
//! - [`types`] - Module types and the closed scalar-type set
//! - [`value`] - `MdpValue` marshalling (little-endian scalars, ASCII strings)
//! - [`transport`] - The raw-transport trait this crate drives
//! - [`registry`] - Module discovery and type-to-id resolution
//! - [`client`] - The `MdpClient` connection and parameter API
//! - [`poll`] - Polling and change-notification streams
//! - [`sim`] - An in-memory simulated target for tests and diagnostics
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```
//! use mdplink::{DeviceSim, MdpClient, MdpDataType, MdpValue, ModuleType};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> mdplink::Result<()> {
//! let sim = DeviceSim::new();
//! sim.add_module(1, ModuleType::Cpu);
//! sim.set_parameter_read_only(1, 1, 1, &MdpValue::U32(2496));
//!
//! let mut client = MdpClient::new(Box::new(sim));
//! client.connect_local().await?;
//!
//! let frequency = client
//!     .read_parameter(ModuleType::Cpu, 1, 1, MdpDataType::U32)
//!     .await?;
//! assert_eq!(frequency, MdpValue::U32(2496));
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod client;
pub mod error;
pub mod netid;
pub mod poll;
pub mod registry;
pub mod sim;
pub mod transport;
pub mod types;
pub mod value;

// Re-export commonly used types at the crate root
pub use address::{MdpAddress, MdpArea};
pub use client::{ClientSettings, ConnectionState, MdpClient};
pub use error::{MdpError, Result};
pub use netid::{AmsNetId, ParseNetIdError};
pub use poll::{ChangePoll, Parameter, ParameterPoll};
pub use registry::ModuleRegistry;
pub use sim::DeviceSim;
pub use transport::{Transport, TransportError};
pub use types::{MdpDataType, ModuleInfo, ModuleType};
pub use value::{MAX_STRING_LEN, MdpValue};
