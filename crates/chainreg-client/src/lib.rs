//! chainreg-client — chain-aware registry facades.
//!
//! The entry point is [`for_chain`]: it maps a chain id to a
//! [`RegistryFactory`] through a closed dispatch table, and the factory
//! constructs one facade per registry domain bound to that chain's expected
//! contract version. Facades talk to contracts only through the capability
//! traits in `chainreg-core`; [`mock`] provides an in-memory implementation
//! of those traits for tests and CLI diagnostics.

pub mod blockchain;
pub mod channels;
pub mod delegation;
mod facade;
pub mod mock;
pub mod resolver;
pub mod selector;
pub mod stream;
pub mod wallet_link;

pub use blockchain::Blockchain;
pub use channels::ChannelRegistry;
pub use delegation::DelegationRegistry;
pub use resolver::resolve;
pub use selector::{for_chain, RegistryFactory, SUPPORTED_CHAINS};
pub use stream::{StreamAllocated, StreamRegistry};
pub use wallet_link::WalletLinkRegistry;
