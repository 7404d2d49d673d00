pub mod protocol;

pub use protocol::SnapshotLayout;
