pub mod init;
pub mod network;
pub mod record;
pub mod spec;

pub use init::Initializer;
pub use network::{ForwardPass, Gradients, Network, Propagation};
pub use record::ModelRecord;
pub use spec::{HiddenActivation, NetworkSpec};
