// Building blocks shared by the FAT family

pub mod constants;
pub mod directory;
pub mod structures;
pub mod timestamps;

pub use constants::*;
pub use directory::*;
pub use structures::*;
pub use timestamps::*;
