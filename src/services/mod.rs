pub mod block;
pub mod drilldown;
pub mod providers;
pub mod recommendations;

pub use block::BlockService;
