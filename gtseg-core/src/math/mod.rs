mod bounds;
pub use self::bounds::*;

mod rigid;
pub use self::rigid::*;
