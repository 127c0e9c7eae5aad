pub mod finger;
pub mod key;
pub mod mapping;
pub mod note;
pub mod resolver;
pub mod scale;
pub mod table;

pub use finger::*;
pub use key::*;
pub use mapping::*;
pub use note::*;
pub use resolver::*;
pub use scale::*;
pub use table::*;
