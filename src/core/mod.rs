// Analysis core: pure functions over fetched records
pub mod clustering {
    pub use crate::clustering::*;
}

pub mod gaps {
    pub use crate::gaps::*;
}

pub mod report {
    pub use crate::report::*;
}

pub mod recommendations {
    pub use crate::recommendations::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
