pub mod bookkeeping;
pub mod reference_file;
pub mod registry;
pub mod soil_map;

pub use bookkeeping::BookkeepingClient;
pub use reference_file::load_reference;
pub use registry::ParcelRegistryClient;
pub use soil_map::SoilMapClient;
